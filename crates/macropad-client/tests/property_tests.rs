//! Property tests for read reassembly and the debug log

use proptest::prelude::*;
use serde_json::json;

use macropad_client::engine::RequestEngine;
use macropad_client::{ClientConfig, DebugLog, LogDirection};
use macropad_frame::{FrameCodec, FrameMode};
use macropad_protocol::{Command, Response};
use macropad_transport::mock::MockTransport;

fn reply_bytes(mode: FrameMode, name: &str) -> Result<Vec<u8>, TestCaseError> {
    let body = json!({
        "config": {
            "settings": {},
            "mappings": {},
            "button_names": {"0": name}
        },
        "header": {"version": 0x0001_0000}
    });
    let payload = serde_json::to_vec(&body).map_err(|e| TestCaseError::fail(e.to_string()))?;
    FrameCodec::new(mode)
        .encode(&payload)
        .map_err(|e| TestCaseError::fail(e.to_string()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_any_read_split_yields_same_response(
        chunk in 1usize..96,
        name in "[a-zA-Z0-9 ]{0,24}",
        raw in any::<bool>(),
    ) {
        let mode = if raw { FrameMode::Raw } else { FrameMode::Framed };
        let mut transport = MockTransport::new();
        transport.queue_chunked(&reply_bytes(mode, &name)?, chunk);

        let config = ClientConfig {
            frame_mode: mode,
            decode_backoff_ms: 0,
            ..ClientConfig::default()
        };
        let mut engine = RequestEngine::new(&config);
        let command = Command::get_config(engine.next_header());

        let response = tokio_test::block_on(engine.send(&mut transport, &command))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let Response::Config(body) = response else {
            return Err(TestCaseError::fail("expected Config response"));
        };
        prop_assert_eq!(
            body.config.button_names.as_ref().and_then(|names| names.get(&0)),
            Some(&name)
        );
        prop_assert!(!engine.needs_drain());
    }

    #[test]
    fn prop_debug_log_is_bounded_and_newest_first(
        capacity in 1usize..16,
        count in 0usize..40,
    ) {
        let log = DebugLog::new(capacity);
        for i in 0..count {
            log.record(LogDirection::Sent, i.to_string().as_bytes());
        }

        let entries = log.entries();
        prop_assert_eq!(entries.len(), count.min(capacity));
        for (offset, entry) in entries.iter().enumerate() {
            let expected = count - 1 - offset;
            prop_assert_eq!(&entry.data, &expected.to_string());
        }
    }
}
