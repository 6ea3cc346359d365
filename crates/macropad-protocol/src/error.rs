//! Protocol error types

use thiserror::Error;

/// Errors raised while encoding commands or decoding responses
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// A command could not be serialized
    #[error("Command encoding failed: {0}")]
    Encode(String),

    /// Payload is not valid JSON
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// Payload is valid JSON but not a recognized response shape
    #[error("Invalid response structure: {0}")]
    InvalidStructure(String),

    /// An action entry did not match any known encoding
    #[error("Unrecognized action: {0}")]
    UnrecognizedAction(String),
}

impl ProtocolError {
    /// True when the payload was received but could not be understood
    pub fn is_malformed_response(&self) -> bool {
        matches!(
            self,
            ProtocolError::InvalidJson(_)
                | ProtocolError::InvalidStructure(_)
                | ProtocolError::UnrecognizedAction(_)
        )
    }
}

/// Specialized Result type for protocol operations
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
