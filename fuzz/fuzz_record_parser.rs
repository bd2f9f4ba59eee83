//! Fuzz target for reading back version records.
//!
//! Run with: cargo +nightly fuzz run fuzz_record_parser
//!
//! Any record `VersionRecord::from_json` accepts must re-encode to JSON that
//! it accepts again with identical fields.

#![no_main]

use libfuzzer_sys::fuzz_target;
use verstamp_core::VersionRecord;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(record) = VersionRecord::from_json(s, "v") {
        let encoded = record.to_json(false).expect("encoding an accepted record");
        let again = VersionRecord::from_json(&encoded, "v").expect("re-reading own output");
        assert_eq!(record, again);
    }
});
