//! Configuration model error types

use thiserror::Error;

/// Errors raised by the configuration model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No widget with this id in the current view
    #[error("Widget {0} not found")]
    WidgetNotFound(u32),

    /// Widget form failed validation
    #[error("Invalid widget: {0}")]
    InvalidWidget(String),

    /// Every widget id is taken
    #[error("No widget ids left")]
    WidgetIdsExhausted,

    /// An action value could not be normalized
    #[error("Invalid action: {0}")]
    InvalidAction(String),
}

impl ConfigError {
    /// True for errors caused by user input rather than model state
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ConfigError::InvalidWidget(_) | ConfigError::InvalidAction(_)
        )
    }
}

/// Specialized Result type for configuration model operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
