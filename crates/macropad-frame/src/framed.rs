//! Length-prefixed framing
//!
//! Every message is `magic:u32 | length:u32 | payload[length]`, both header
//! fields big-endian. Reads are reassembled in a buffer until a whole frame
//! is present; bytes past the end of a frame stay buffered for the next one.

use tracing::trace;

use crate::error::{FrameError, FrameResult};
use crate::{DEFAULT_MAX_BUFFER, MAGIC_WORD};

/// Fixed eight-byte frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Magic word identifying a frame start
    pub magic: u32,
    /// Payload length in bytes
    pub payload_len: u32,
}

impl FrameHeader {
    /// Header size in bytes
    pub const SIZE: usize = 8;

    /// Create a header carrying the default magic word
    pub fn new(payload_len: u32) -> Self {
        Self {
            magic: MAGIC_WORD,
            payload_len,
        }
    }

    /// Encode the header to bytes
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let [m0, m1, m2, m3] = self.magic.to_be_bytes();
        let [l0, l1, l2, l3] = self.payload_len.to_be_bytes();
        [m0, m1, m2, m3, l0, l1, l2, l3]
    }

    /// Decode a header from the start of `bytes`
    pub fn decode(bytes: &[u8]) -> FrameResult<Self> {
        let Some(&[m0, m1, m2, m3, l0, l1, l2, l3]) = bytes.first_chunk::<8>() else {
            return Err(FrameError::Truncated {
                needed: Self::SIZE,
                available: bytes.len(),
            });
        };

        Ok(Self {
            magic: u32::from_be_bytes([m0, m1, m2, m3]),
            payload_len: u32::from_be_bytes([l0, l1, l2, l3]),
        })
    }

    /// Total frame size (header plus payload)
    pub fn frame_len(&self) -> usize {
        Self::SIZE.saturating_add(usize::try_from(self.payload_len).unwrap_or(usize::MAX))
    }
}

/// Encode a payload into a single frame
pub fn encode_frame(magic: u32, payload: &[u8], max_payload: usize) -> FrameResult<Vec<u8>> {
    let too_large = FrameError::PayloadTooLarge {
        size: payload.len(),
        limit: max_payload,
    };
    if payload.len() > max_payload {
        return Err(too_large);
    }
    let payload_len = u32::try_from(payload.len()).ok().ok_or(too_large)?;

    let header = FrameHeader { magic, payload_len };
    let mut frame = Vec::with_capacity(header.frame_len());
    frame.extend_from_slice(&header.encode());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Incremental decoder for length-prefixed frames
#[derive(Debug, Clone)]
pub struct FramedDecoder {
    magic: u32,
    max_payload: usize,
    buffer: Vec<u8>,
}

impl FramedDecoder {
    /// Create a decoder with the default magic word and size limit
    pub fn new() -> Self {
        Self::with_limits(MAGIC_WORD, DEFAULT_MAX_BUFFER)
    }

    /// Create a decoder with a custom magic word and payload limit
    pub fn with_limits(magic: u32, max_payload: usize) -> Self {
        Self {
            magic,
            max_payload,
            buffer: Vec::new(),
        }
    }

    /// Append a chunk and try to extract one complete payload.
    ///
    /// Returns `Ok(None)` while the frame is still incomplete. A wrong magic
    /// word or an oversized length fails immediately instead of waiting for
    /// more bytes.
    pub fn feed(&mut self, chunk: &[u8]) -> FrameResult<Option<Vec<u8>>> {
        self.buffer.extend_from_slice(chunk);
        self.poll()
    }

    /// Try to extract a complete payload from already buffered bytes
    pub fn poll(&mut self) -> FrameResult<Option<Vec<u8>>> {
        if let Some(&magic) = self.buffer.first_chunk::<4>() {
            let found = u32::from_be_bytes(magic);
            if found != self.magic {
                return Err(FrameError::MagicMismatch {
                    expected: self.magic,
                    found,
                });
            }
        }
        if self.buffer.len() < FrameHeader::SIZE {
            return Ok(None);
        }

        let header = FrameHeader::decode(&self.buffer)?;

        let payload_len = usize::try_from(header.payload_len).unwrap_or(usize::MAX);
        if payload_len > self.max_payload {
            return Err(FrameError::PayloadTooLarge {
                size: payload_len,
                limit: self.max_payload,
            });
        }

        let frame_len = header.frame_len();
        if self.buffer.len() < frame_len {
            trace!(
                buffered = self.buffer.len(),
                frame_len, "waiting for remainder of frame"
            );
            return Ok(None);
        }

        let payload = self
            .buffer
            .drain(..frame_len)
            .skip(FrameHeader::SIZE)
            .collect::<Vec<u8>>();
        trace!(
            payload_len,
            retained = self.buffer.len(),
            "frame complete"
        );
        Ok(Some(payload))
    }

    /// Bytes currently held without forming a complete frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Discard all buffered bytes
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

impl Default for FramedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_header_layout_is_big_endian() {
        let header = FrameHeader::new(0x0102_0304);
        assert_eq!(
            header.encode(),
            [0xE5, 0x9D, 0xEC, 0xC0, 0x01, 0x02, 0x03, 0x04]
        );
    }

    #[test]
    fn test_header_decode_truncated() {
        let result = FrameHeader::decode(&[0xE5, 0x9D]);
        assert_eq!(
            result,
            Err(FrameError::Truncated {
                needed: 8,
                available: 2
            })
        );
    }

    #[test]
    fn test_decode_single_frame() -> TestResult {
        let frame = encode_frame(MAGIC_WORD, b"{}", DEFAULT_MAX_BUFFER)?;
        let mut decoder = FramedDecoder::new();
        assert_eq!(decoder.feed(&frame)?, Some(b"{}".to_vec()));
        assert_eq!(decoder.buffered(), 0);
        Ok(())
    }

    #[test]
    fn test_partial_header_waits() -> TestResult {
        let frame = encode_frame(MAGIC_WORD, b"{}", DEFAULT_MAX_BUFFER)?;
        let mut decoder = FramedDecoder::new();
        assert_eq!(decoder.feed(&frame[..3])?, None);
        assert_eq!(decoder.feed(&frame[3..])?, Some(b"{}".to_vec()));
        Ok(())
    }

    #[test]
    fn test_trailing_bytes_are_retained() -> TestResult {
        let mut stream = encode_frame(MAGIC_WORD, b"[1]", DEFAULT_MAX_BUFFER)?;
        stream.extend(encode_frame(MAGIC_WORD, b"[2]", DEFAULT_MAX_BUFFER)?);

        let mut decoder = FramedDecoder::new();
        assert_eq!(decoder.feed(&stream)?, Some(b"[1]".to_vec()));
        assert_eq!(decoder.buffered(), 11);
        assert_eq!(decoder.poll()?, Some(b"[2]".to_vec()));
        assert_eq!(decoder.poll()?, None);
        Ok(())
    }

    #[test]
    fn test_magic_mismatch_fails_fast() {
        let mut decoder = FramedDecoder::new();
        let result = decoder.feed(br#"{"Config":{}}"#);
        assert!(matches!(
            result,
            Err(FrameError::MagicMismatch {
                expected: MAGIC_WORD,
                found: 0x7B22_436F
            })
        ));
    }

    #[test]
    fn test_magic_checked_before_full_header() {
        let mut decoder = FramedDecoder::new();
        let result = decoder.feed(&[0xDE, 0xAD, 0xBE, 0xEF, 0x00]);
        assert!(matches!(result, Err(FrameError::MagicMismatch { found: 0xDEAD_BEEF, .. })));
    }

    #[test]
    fn test_oversized_length_fails_before_payload_arrives() {
        let header = FrameHeader::new(1024);
        let mut decoder = FramedDecoder::with_limits(MAGIC_WORD, 512);
        let result = decoder.feed(&header.encode());
        assert_eq!(
            result,
            Err(FrameError::PayloadTooLarge {
                size: 1024,
                limit: 512
            })
        );
    }

    #[test]
    fn test_encode_rejects_oversized_payload() {
        let result = encode_frame(MAGIC_WORD, &[0u8; 16], 8);
        assert_eq!(result, Err(FrameError::PayloadTooLarge { size: 16, limit: 8 }));
    }

    #[test]
    fn test_empty_payload_frame() -> TestResult {
        let frame = encode_frame(MAGIC_WORD, b"", DEFAULT_MAX_BUFFER)?;
        assert_eq!(frame.len(), FrameHeader::SIZE);
        let mut decoder = FramedDecoder::new();
        assert_eq!(decoder.feed(&frame)?, Some(Vec::new()));
        Ok(())
    }

    #[test]
    fn test_reset_discards_partial_frame() -> TestResult {
        let frame = encode_frame(MAGIC_WORD, b"{}", DEFAULT_MAX_BUFFER)?;
        let mut decoder = FramedDecoder::new();
        assert_eq!(decoder.feed(&frame[..9])?, None);
        decoder.reset();
        assert_eq!(decoder.buffered(), 0);
        assert_eq!(decoder.feed(&frame)?, Some(b"{}".to_vec()));
        Ok(())
    }
}
