//! Unframed JSON stream decoding
//!
//! In raw mode the device writes bare JSON with no length prefix. Message
//! boundaries are found by attempting a parse of the accumulated bytes; any
//! parse failure is treated as "incomplete" and the decoder waits for more.

use serde::de::IgnoredAny;
use tracing::{debug, trace};

use crate::DEFAULT_MAX_BUFFER;
use crate::error::{FrameError, FrameResult};

/// Incremental decoder for a stream of concatenated JSON documents
#[derive(Debug, Clone)]
pub struct RawJsonDecoder {
    max_buffer: usize,
    buffer: Vec<u8>,
}

impl RawJsonDecoder {
    /// Create a decoder with the default 10 MiB accumulation limit
    pub fn new() -> Self {
        Self::with_max_buffer(DEFAULT_MAX_BUFFER)
    }

    /// Create a decoder with a custom accumulation limit
    pub fn with_max_buffer(max_buffer: usize) -> Self {
        Self {
            max_buffer,
            buffer: Vec::new(),
        }
    }

    /// Append a chunk and try to extract one complete JSON document
    pub fn feed(&mut self, chunk: &[u8]) -> FrameResult<Option<Vec<u8>>> {
        self.buffer.extend_from_slice(chunk);
        if self.buffer.len() > self.max_buffer {
            return Err(FrameError::BufferLimitExceeded {
                size: self.buffer.len(),
                limit: self.max_buffer,
            });
        }
        Ok(self.poll())
    }

    /// Try to extract a complete document from already buffered bytes
    pub fn poll(&mut self) -> Option<Vec<u8>> {
        let mut stream =
            serde_json::Deserializer::from_slice(&self.buffer).into_iter::<IgnoredAny>();

        match stream.next() {
            Some(Ok(IgnoredAny)) => {
                let end = stream.byte_offset();
                let document = self.buffer.drain(..end).collect::<Vec<u8>>();
                trace!(
                    len = document.len(),
                    retained = self.buffer.len(),
                    "raw document complete"
                );
                Some(document)
            }
            Some(Err(e)) if e.is_eof() => {
                trace!(buffered = self.buffer.len(), "raw document incomplete");
                None
            }
            Some(Err(e)) => {
                debug!(
                    buffered = self.buffer.len(),
                    error = %e,
                    "raw buffer does not parse yet, waiting for more bytes"
                );
                None
            }
            None => None,
        }
    }

    /// Bytes currently held without forming a complete document
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Discard all buffered bytes
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

impl Default for RawJsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}
