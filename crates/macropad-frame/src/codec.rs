//! Codec selection between framed and raw modes

use serde::{Deserialize, Serialize};

use crate::error::FrameResult;
use crate::framed::{FramedDecoder, encode_frame};
use crate::raw::RawJsonDecoder;
use crate::{DEFAULT_MAX_BUFFER, MAGIC_WORD};

/// Wire framing used on a connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameMode {
    /// Magic word and big-endian length prefix
    #[default]
    Framed,
    /// Bare JSON documents, delimited by parsing
    Raw,
}

impl std::fmt::Display for FrameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameMode::Framed => write!(f, "framed"),
            FrameMode::Raw => write!(f, "raw"),
        }
    }
}

/// Encoder and decoder factory for one connection's framing mode
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    mode: FrameMode,
    magic: u32,
    max_size: usize,
}

impl FrameCodec {
    /// Create a codec with the default magic word and 10 MiB limit
    pub fn new(mode: FrameMode) -> Self {
        Self {
            mode,
            magic: MAGIC_WORD,
            max_size: DEFAULT_MAX_BUFFER,
        }
    }

    /// Override the magic word used for framed mode
    pub fn with_magic(mut self, magic: u32) -> Self {
        self.magic = magic;
        self
    }

    /// Override the payload and buffer size limit
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Framing mode
    pub fn mode(&self) -> FrameMode {
        self.mode
    }

    /// Magic word used in framed mode
    pub fn magic(&self) -> u32 {
        self.magic
    }

    /// Size limit in bytes
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Encode a payload for transmission.
    ///
    /// Framed mode prepends the header. Raw mode sends the payload unchanged
    /// but still enforces the size limit.
    pub fn encode(&self, payload: &[u8]) -> FrameResult<Vec<u8>> {
        match self.mode {
            FrameMode::Framed => encode_frame(self.magic, payload, self.max_size),
            FrameMode::Raw => {
                if payload.len() > self.max_size {
                    return Err(crate::FrameError::PayloadTooLarge {
                        size: payload.len(),
                        limit: self.max_size,
                    });
                }
                Ok(payload.to_vec())
            }
        }
    }

    /// Create a fresh stream decoder for one response
    pub fn decoder(&self) -> StreamDecoder {
        match self.mode {
            FrameMode::Framed => {
                StreamDecoder::Framed(FramedDecoder::with_limits(self.magic, self.max_size))
            }
            FrameMode::Raw => StreamDecoder::Raw(RawJsonDecoder::with_max_buffer(self.max_size)),
        }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(FrameMode::default())
    }
}

/// Decoder for either framing mode
#[derive(Debug, Clone)]
pub enum StreamDecoder {
    /// Length-prefixed decoder
    Framed(FramedDecoder),
    /// Raw JSON decoder
    Raw(RawJsonDecoder),
}

impl StreamDecoder {
    /// Append a chunk and try to extract one complete payload
    pub fn feed(&mut self, chunk: &[u8]) -> FrameResult<Option<Vec<u8>>> {
        match self {
            StreamDecoder::Framed(decoder) => decoder.feed(chunk),
            StreamDecoder::Raw(decoder) => decoder.feed(chunk),
        }
    }

    /// Try to extract a payload from bytes already buffered
    pub fn poll(&mut self) -> FrameResult<Option<Vec<u8>>> {
        match self {
            StreamDecoder::Framed(decoder) => decoder.poll(),
            StreamDecoder::Raw(decoder) => Ok(decoder.poll()),
        }
    }

    /// Bytes buffered past the last complete payload
    pub fn buffered(&self) -> usize {
        match self {
            StreamDecoder::Framed(decoder) => decoder.buffered(),
            StreamDecoder::Raw(decoder) => decoder.buffered(),
        }
    }

    /// Discard all buffered bytes
    pub fn reset(&mut self) {
        match self {
            StreamDecoder::Framed(decoder) => decoder.reset(),
            StreamDecoder::Raw(decoder) => decoder.reset(),
        }
    }

    /// Framing mode of this decoder
    pub fn mode(&self) -> FrameMode {
        match self {
            StreamDecoder::Framed(_) => FrameMode::Framed,
            StreamDecoder::Raw(_) => FrameMode::Raw,
        }
    }
}
