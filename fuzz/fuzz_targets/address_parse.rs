#![no_main]

use libfuzzer_sys::fuzz_target;
use qtc_core::{format_address, is_valid_address, Address};

fuzz_target!(|data: &[u8]| {
    // Validation and display formatting must never panic, including on
    // multi-byte characters.
    if let Ok(s) = std::str::from_utf8(data) {
        let valid = is_valid_address(s);
        assert_eq!(valid, s.parse::<Address>().is_ok());
        let _ = format_address(s);
    }
});
