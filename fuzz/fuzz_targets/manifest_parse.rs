//! Fuzz target for COCO manifest parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run manifest_parse

#![no_main]

use cocomerge::coco::io::from_manifest_slice;
use cocomerge::validation::{validate_manifest, ValidateOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // 10MB is generous for an annotation manifest.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    // Anything that parses must also validate without panicking.
    if let Ok(manifest) = from_manifest_slice(data) {
        let _ = validate_manifest(&manifest, &ValidateOptions::default());
    }
});
