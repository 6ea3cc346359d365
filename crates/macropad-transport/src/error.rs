//! Transport error types

use thiserror::Error;

/// Errors raised by USB transports
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No attached device matched the target ids
    #[error("Device {vendor_id:04x}:{product_id:04x} not found")]
    DeviceNotFound {
        /// Vendor id searched for
        vendor_id: u16,
        /// Product id searched for
        product_id: u16,
    },

    /// Device was found but could not be opened
    #[error("Failed to open device: {0}")]
    OpenFailed(String),

    /// Configuration could not be selected
    #[error("Failed to select configuration {configuration}: {reason}")]
    ConfigurationFailed {
        /// Configuration value
        configuration: u8,
        /// Underlying error
        reason: String,
    },

    /// Interface claim was refused
    #[error("Failed to claim interface {interface}: {reason}")]
    ClaimFailed {
        /// Interface number
        interface: u8,
        /// Underlying error
        reason: String,
    },

    /// Device went away
    #[error("Device disconnected")]
    Disconnected,

    /// Transport was already closed
    #[error("Transport is closed")]
    Closed,

    /// Fewer bytes were written than requested
    #[error("Short write: {written} of {expected} bytes")]
    ShortWrite {
        /// Bytes accepted
        written: usize,
        /// Bytes requested
        expected: usize,
    },

    /// Device sent more data than requested
    #[error("Babble on IN endpoint")]
    Babble,

    /// Endpoint halt could not be cleared
    #[error("Failed to clear halt on endpoint 0x{endpoint:02x}: {reason}")]
    ClearHaltFailed {
        /// Endpoint address
        endpoint: u8,
        /// Underlying error
        reason: String,
    },

    /// Transfer was cancelled
    #[error("Transfer cancelled")]
    Cancelled,

    /// Other I/O failure
    #[error("USB I/O error: {0}")]
    Io(String),
}

impl TransportError {
    /// True when the device handle is no longer usable
    pub fn is_disconnect(&self) -> bool {
        matches!(self, TransportError::Disconnected | TransportError::Closed)
    }

    /// True when the error happened while opening the device
    pub fn is_open_failure(&self) -> bool {
        matches!(
            self,
            TransportError::DeviceNotFound { .. }
                | TransportError::OpenFailed(_)
                | TransportError::ConfigurationFailed { .. }
                | TransportError::ClaimFailed { .. }
        )
    }

    /// Create a device-not-found error
    pub fn not_found(vendor_id: u16, product_id: u16) -> Self {
        TransportError::DeviceNotFound {
            vendor_id,
            product_id,
        }
    }
}

/// Specialized Result type for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;
