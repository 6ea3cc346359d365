//! Fuzzes response parsing and translation into the host config model.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_response_parser
#![no_main]
use libfuzzer_sys::fuzz_target;
use macropad_config::DeviceConfig;
use macropad_protocol::{Response, parse_response};

fuzz_target!(|data: &[u8]| {
    // Must never panic on arbitrary bytes; errors are expected, panics are not.
    if let Ok(Response::Config(body)) = parse_response(data) {
        let model = DeviceConfig::from_wire(body.config);
        let _wire = model.to_wire();
    }
});
