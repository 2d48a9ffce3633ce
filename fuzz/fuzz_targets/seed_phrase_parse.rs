#![no_main]

use libfuzzer_sys::fuzz_target;
use qtc_core::seed::{is_valid_seed_phrase, parse_seed_phrase};
use qtc_core::KeyPair;

fuzz_target!(|data: &[u8]| {
    // Parsing arbitrary text must never panic, and must agree with the
    // boolean validator.
    if let Ok(s) = std::str::from_utf8(data) {
        let parsed = parse_seed_phrase(s);
        assert_eq!(parsed.is_ok(), is_valid_seed_phrase(s));

        // Anything accepted re-parses from its canonical form to the same keys
        if let Ok(phrase) = parsed {
            let canonical = phrase.to_phrase();
            let again = parse_seed_phrase(&canonical).expect("canonical phrase parses");
            assert_eq!(
                KeyPair::from_seed_phrase(&phrase),
                KeyPair::from_seed_phrase(&again)
            );
        }
    }
});
