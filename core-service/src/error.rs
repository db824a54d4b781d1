use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(#[from] core_runtime::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] core_catalog::CatalogError),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),

    #[error("Authentication error: {0}")]
    Auth(#[from] core_auth::AuthError),
}

impl CoreError {
    /// Text suitable for showing to the listener.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::InitializationFailed(error) => error.to_string(),
            CoreError::Catalog(error) => error.user_message(),
            CoreError::Playback(error) => error.user_message(),
            CoreError::Auth(error) => error.user_message(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
