//! Error types for the REST provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RestError {
    /// The service answered with a non-2xx status
    #[error("API error (status {status}): {}", message.as_deref().unwrap_or("no message"))]
    Status {
        status: u16,
        message: Option<String>,
    },

    /// A 2xx body did not match the expected shape
    #[error("Failed to parse API response: {0}")]
    ParseError(String),
}

/// Result type for REST provider operations
pub type Result<T> = std::result::Result<T, RestError>;

impl From<RestError> for BridgeError {
    fn from(error: RestError) -> Self {
        match error {
            RestError::Status { status, message } => BridgeError::Rejected { status, message },
            RestError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
        }
    }
}
