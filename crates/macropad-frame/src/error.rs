//! Framing error types

use thiserror::Error;

/// Errors raised while encoding or reassembling frames
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The first four bytes of a frame were not the expected magic word
    #[error("Frame magic mismatch: expected 0x{expected:08X}, found 0x{found:08X}")]
    MagicMismatch {
        /// Configured magic word
        expected: u32,
        /// Value read from the stream
        found: u32,
    },

    /// Declared or supplied payload length exceeds the configured limit
    #[error("Frame payload of {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge {
        /// Offending payload size
        size: usize,
        /// Configured limit
        limit: usize,
    },

    /// Accumulated bytes without a complete message exceed the limit
    #[error("Receive buffer grew to {size} bytes without a complete message (limit {limit})")]
    BufferLimitExceeded {
        /// Bytes held in the buffer
        size: usize,
        /// Configured limit
        limit: usize,
    },

    /// Not enough bytes to decode a structure
    #[error("Truncated input: needed {needed} bytes, got {available}")]
    Truncated {
        /// Bytes required
        needed: usize,
        /// Bytes available
        available: usize,
    },
}

impl FrameError {
    /// True when the stream itself is corrupt and further bytes cannot help
    pub fn is_corruption(&self) -> bool {
        matches!(self, FrameError::MagicMismatch { .. })
    }

    /// True for size-limit violations
    pub fn is_size_limit(&self) -> bool {
        matches!(
            self,
            FrameError::PayloadTooLarge { .. } | FrameError::BufferLimitExceeded { .. }
        )
    }
}

/// Specialized Result type for framing operations
pub type FrameResult<T> = std::result::Result<T, FrameError>;
