use bridge_traits::error::BridgeError;
use std::fmt;
use thiserror::Error;

/// Toast text when sign-in fails without a server message.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";

/// Toast text for every other failure without a server message.
pub const GENERIC_FAILURE_MESSAGE: &str = "An Error Occurred";

/// Remote identity operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOperation {
    Login,
    Register,
    FetchUser,
    TogglePlaylist,
}

impl fmt::Display for AuthOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuthOperation::Login => "login",
            AuthOperation::Register => "register",
            AuthOperation::FetchUser => "fetch user",
            AuthOperation::TogglePlaylist => "toggle playlist",
        })
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{operation} failed: {source}")]
    Gateway {
        operation: AuthOperation,
        #[source]
        source: BridgeError,
    },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Secure storage unavailable: {0}")]
    SecureStorageUnavailable(String),

    #[error("Stored token is corrupted: {0}")]
    TokenCorrupted(String),
}

impl AuthError {
    /// Server-supplied message when present, otherwise the fallback for the
    /// operation.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Gateway { operation, source } => {
                let fallback = match operation {
                    AuthOperation::Login | AuthOperation::Register => LOGIN_FAILED_MESSAGE,
                    AuthOperation::FetchUser | AuthOperation::TogglePlaylist => {
                        GENERIC_FAILURE_MESSAGE
                    }
                };
                source.server_message().unwrap_or(fallback).to_string()
            }
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
