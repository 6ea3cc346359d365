//! Stream-level decoding scenarios

use macropad_frame::{FrameCodec, FrameError, FrameMode, StreamDecoder};

type TestResult = Result<(), Box<dyn std::error::Error>>;

const CONFIG_RESPONSE: &[u8] = br#"{"Config":{"header":{"version":65536,"correlationId":1},"config":{"settings":{},"mappings":{"1":["KeyRelease"]},"button_names":{"0":"Vol+"}}}}"#;

fn drain(decoder: &mut StreamDecoder, bytes: &[u8], chunk: usize) -> Result<Vec<Vec<u8>>, FrameError> {
    let mut out = Vec::new();
    for piece in bytes.chunks(chunk) {
        if let Some(payload) = decoder.feed(piece)? {
            out.push(payload);
        }
    }
    Ok(out)
}

mod framed_tests {
    use super::*;

    #[test]
    fn test_single_read_and_byte_by_byte_agree() -> TestResult {
        let codec = FrameCodec::new(FrameMode::Framed);
        let bytes = codec.encode(CONFIG_RESPONSE)?;

        let whole = drain(&mut codec.decoder(), &bytes, 2048)?;
        let trickle = drain(&mut codec.decoder(), &bytes, 1)?;

        assert_eq!(whole, vec![CONFIG_RESPONSE.to_vec()]);
        assert_eq!(whole, trickle);
        Ok(())
    }

    #[test]
    fn test_corrupted_magic_fails_without_waiting() -> TestResult {
        let codec = FrameCodec::new(FrameMode::Framed);
        let mut bytes = codec.encode(CONFIG_RESPONSE)?;
        if let Some(first) = bytes.first_mut() {
            *first ^= 0xFF;
        }

        let mut decoder = codec.decoder();
        let result = decoder.feed(bytes.get(..4).unwrap_or_default());
        assert!(matches!(result, Err(FrameError::MagicMismatch { .. })));
        Ok(())
    }

    #[test]
    fn test_raw_json_sent_to_framed_decoder_is_rejected() {
        let mut decoder = FrameCodec::new(FrameMode::Framed).decoder();
        let result = decoder.feed(CONFIG_RESPONSE);
        assert!(matches!(result, Err(FrameError::MagicMismatch { .. })));
    }

    #[test]
    fn test_limit_applies_to_declared_length() -> TestResult {
        let sender = FrameCodec::new(FrameMode::Framed);
        let receiver = FrameCodec::new(FrameMode::Framed).with_max_size(16);
        let bytes = sender.encode(CONFIG_RESPONSE)?;

        let mut decoder = receiver.decoder();
        let result = decoder.feed(bytes.get(..8).unwrap_or_default());
        assert!(matches!(result, Err(FrameError::PayloadTooLarge { .. })));
        Ok(())
    }
}

mod raw_tests {
    use super::*;

    #[test]
    fn test_single_read_and_byte_by_byte_agree() -> TestResult {
        let codec = FrameCodec::new(FrameMode::Raw);

        let whole = drain(&mut codec.decoder(), CONFIG_RESPONSE, 2048)?;
        let trickle = drain(&mut codec.decoder(), CONFIG_RESPONSE, 1)?;

        assert_eq!(whole, vec![CONFIG_RESPONSE.to_vec()]);
        assert_eq!(whole, trickle);
        Ok(())
    }

    #[test]
    fn test_accumulation_limit() {
        let codec = FrameCodec::new(FrameMode::Raw).with_max_size(32);
        let mut decoder = codec.decoder();
        let result = drain(&mut decoder, CONFIG_RESPONSE, 8);
        assert!(matches!(result, Err(FrameError::BufferLimitExceeded { .. })));
    }

    #[test]
    fn test_reset_between_requests() -> TestResult {
        let codec = FrameCodec::new(FrameMode::Raw);
        let mut decoder = codec.decoder();
        assert_eq!(decoder.feed(br#"{"stale":"#)?, None);
        decoder.reset();
        assert_eq!(decoder.buffered(), 0);
        assert_eq!(decoder.feed(b"{}")?, Some(b"{}".to_vec()));
        Ok(())
    }
}
