//! Fuzz target: `LineDecoder::push` + `EchoCache::apply`
//!
//! Drives arbitrary byte sequences from the collector link through the
//! line decoder and applies every echo record to a cache.  Neither may
//! panic, and echo records must only ever carry record characters.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use reconuav::telemetry::decoder::LINE_CAP;
use reconuav::telemetry::{EchoCache, Inbound, LineDecoder};

fuzz_target!(|data: &[u8]| {
    let mut decoder = LineDecoder::new();
    let mut cache = EchoCache::new();

    for &b in data {
        if let Some(Inbound::Echo(record)) = decoder.push(b) {
            assert!(!record.is_empty(), "decoder must not yield empty records");
            assert!(record.len() <= LINE_CAP);
            assert!(record.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '|')));
            let updated = cache.apply(&record);
            assert!(updated <= 8);
        }
    }

    // After a reset the decoder must accept a clean token again.
    decoder.reset();
    assert_eq!(decoder.feed(b"CLOUD_FAIL\n"), Some(Inbound::CloudFail));
});
