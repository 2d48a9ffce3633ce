#![no_main]

use libfuzzer_sys::fuzz_target;
use qtc_core::crypto::{KdfParams, SealingKey, SALT_LEN};
use std::sync::OnceLock;

static KEY: OnceLock<SealingKey> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    // Opening arbitrary bytes must never panic and must never authenticate.
    let key = KEY.get_or_init(|| {
        let params = KdfParams {
            m_cost: 1024,
            t_cost: 1,
            p_cost: 1,
        };
        SealingKey::derive("fuzz", &[0u8; SALT_LEN], &params).expect("derive fuzz key")
    });
    assert!(key.open(data, b"QTC_SEED").is_err());
});
