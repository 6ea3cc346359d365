//! Fuzzes the framed and raw-JSON stream decoders.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_frame_decoder
#![no_main]
use libfuzzer_sys::fuzz_target;
use macropad_frame::{FrameCodec, FrameMode};

fuzz_target!(|data: &[u8]| {
    // Must never panic on arbitrary bytes; errors are expected, panics are not.
    let split = data.first().map_or(1, |b| usize::from(*b).max(1));
    for mode in [FrameMode::Framed, FrameMode::Raw] {
        let mut decoder = FrameCodec::new(mode).with_max_size(64 * 1024).decoder();
        for chunk in data.chunks(split) {
            match decoder.feed(chunk) {
                Ok(Some(_)) => {
                    while let Ok(Some(_)) = decoder.poll() {}
                }
                Ok(None) => {}
                Err(_) => {
                    decoder.reset();
                }
            }
        }
    }
});
