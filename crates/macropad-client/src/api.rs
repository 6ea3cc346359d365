//! Uniform `{ data, error }` result for UI callers

use serde::Serialize;

use crate::error::{ClientError, ClientResult};

/// Either a value or a display message, never both
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResult<T> {
    /// Value on success
    pub data: Option<T>,
    /// Message on failure
    pub error: Option<String>,
}

impl<T> ApiResult<T> {
    /// Successful result
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// Failed result
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }

    /// Whether this result carries data
    pub fn is_ok(&self) -> bool {
        self.error.is_none() && self.data.is_some()
    }

    /// Convert back into a `Result`, with the message as the error
    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (_, Some(error)) => Err(error),
            (Some(data), None) => Ok(data),
            (None, None) => Err("no data".to_string()),
        }
    }
}

impl<T> From<ClientResult<T>> for ApiResult<T> {
    fn from(result: ClientResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(error) => Self::err(error.to_string()),
        }
    }
}

impl<T> From<ClientError> for ApiResult<T> {
    fn from(error: ClientError) -> Self {
        Self::err(error.to_string())
    }
}
