//! Fuzz target: `SystemConfig::from_json`
//!
//! Arbitrary text must parse to a validated config or a typed error,
//! never a panic.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use reconuav::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else { return };
    if let Ok(config) = SystemConfig::from_json(text) {
        assert!(config.validate().is_ok(), "from_json must only return valid configs");
    }
});
