//! Error types for macropadctl

use macropad_client::ClientError;
use macropad_transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("{0}")]
    Device(String),

    #[error("Device busy: {0}")]
    Busy(String),

    #[error("{0}")]
    Client(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl CliError {
    /// Process exit code for this error class
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::DeviceNotFound(_) => 2,
            CliError::Timeout(_) => 3,
            CliError::Device(_) => 4,
            CliError::Busy(_) => 5,
            _ => 1,
        }
    }
}

impl From<ClientError> for CliError {
    fn from(error: ClientError) -> Self {
        let message = error.to_string();
        match error {
            ClientError::Transport(TransportError::DeviceNotFound { .. }) | ClientError::NotConnected => {
                CliError::DeviceNotFound(message)
            }
            ClientError::Timeout { .. } => CliError::Timeout(message),
            ClientError::Device { .. }
            | ClientError::DomainFailure(_)
            | ClientError::MalformedResponse(_)
            | ClientError::Framing(_)
            | ClientError::CorrelationMismatch { .. } => CliError::Device(message),
            ClientError::Busy => CliError::Busy(message),
            ClientError::InvalidConfig(reason) => CliError::InvalidConfiguration(reason),
            ClientError::Transport(_) | ClientError::Encode(_) => CliError::Client(message),
        }
    }
}
