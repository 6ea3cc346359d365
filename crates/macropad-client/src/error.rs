//! Client error types

use thiserror::Error;

use macropad_frame::FrameError;
use macropad_protocol::ProtocolError;
use macropad_transport::TransportError;

/// Errors surfaced by the request engine and device session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No device is connected
    #[error("Device not connected")]
    NotConnected,

    /// Another request is already in flight
    #[error("Another device operation is already in progress")]
    Busy,

    /// No complete response arrived before the deadline
    #[error("Operation timed out after {timeout_ms}ms")]
    Timeout {
        /// Deadline in milliseconds
        timeout_ms: u64,
    },

    /// Response bytes could not be reassembled
    #[error("Framing error: {0}")]
    Framing(#[from] FrameError),

    /// USB transport failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Device answered with an Error response
    #[error("Device Error: {message} (Code: {code})")]
    Device {
        /// Device message
        message: String,
        /// Device error code
        code: u32,
    },

    /// Device acknowledged the command but reported failure
    #[error("{0}")]
    DomainFailure(String),

    /// Response could not be understood
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Response carried a different correlation id than the request
    #[error("Correlation mismatch: sent {expected}, received {actual}")]
    CorrelationMismatch {
        /// Id sent
        expected: u64,
        /// Id received
        actual: u64,
    },

    /// Command could not be serialized
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Client configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// True when the device handle should be considered gone
    pub fn is_connection_loss(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }

    /// True when retrying the same operation may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ClientError::Busy
                | ClientError::Timeout { .. }
                | ClientError::Framing(_)
                | ClientError::CorrelationMismatch { .. }
        )
    }

    /// Create a timeout error
    pub fn timeout(timeout_ms: u64) -> Self {
        ClientError::Timeout { timeout_ms }
    }

    /// Create a device error
    pub fn device(message: impl Into<String>, code: u32) -> Self {
        ClientError::Device {
            message: message.into(),
            code,
        }
    }
}

impl From<ProtocolError> for ClientError {
    fn from(error: ProtocolError) -> Self {
        match error {
            ProtocolError::Encode(message) => ClientError::Encode(message),
            other => ClientError::MalformedResponse(other.to_string()),
        }
    }
}

/// Specialized Result type for client operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;
