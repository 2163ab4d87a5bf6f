//! Fuzz target: `AdConfig::from_json`
//!
//! Arbitrary bytes must produce either a config or a typed error, and any
//! config that passes `validate()` must have usable pacing values.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use appopen::config::{AdConfig, Platform};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = AdConfig::from_json(text) else {
        return;
    };
    if config.validate().is_ok() {
        assert!(config.max_age_ms() > 0);
        assert!(!config.ad_unit_id(Platform::Android).is_empty());
        assert!(!config.ad_unit_id(Platform::Ios).is_empty());
    }
});
