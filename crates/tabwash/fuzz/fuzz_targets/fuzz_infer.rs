//! Fuzz target for type inference and type conversion.
//!
//! This fuzzer tests that:
//! 1. Inference never panics on any cell values
//! 2. Malformed dates fail conversion instead of crashing
//! 3. Applying inferred types either succeeds or returns an error

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tabwash::{ContainerConfig, DataContainer};

#[derive(Arbitrary, Debug)]
struct Input {
    seed: u64,
    cells: Vec<String>,
}

fuzz_target!(|input: Input| {
    if input.cells.len() > 2_000 {
        return;
    }

    let mut content = String::from("value\n");
    for cell in &input.cells {
        let cell = cell.replace(['\n', '\r', '"', ','], " ");
        content.push_str(&cell);
        content.push('\n');
    }

    let config = ContainerConfig {
        seed: Some(input.seed),
        ..ContainerConfig::default()
    };
    let _ = DataContainer::builder()
        .contents("fuzz.csv", content)
        .config(config)
        .build();
});
