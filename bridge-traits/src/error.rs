use thiserror::Error;

/// Failure reported by a host bridge.
///
/// `Transport` and `Rejected` are the two remote-call failure kinds the core
/// distinguishes; both carry enough context to build a user-facing message.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// Network unreachable, connection reset, timeout.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The remote answered with a non-2xx status.
    #[error("Server rejected request (status {status}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },
}

impl BridgeError {
    /// Human-readable text supplied by the server, if the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            BridgeError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, BridgeError::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
