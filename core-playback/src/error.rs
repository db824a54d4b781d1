//! # Playback Error Types

use core_catalog::CatalogError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Attempted to start playback with nothing selected.
    #[error("No song selected")]
    NoSelection,

    /// Navigation requires at least one song in the catalog.
    #[error("Catalog is empty")]
    EmptyCatalog,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl PlaybackError {
    /// Returns `true` for caller precondition failures (no remote call was made).
    pub fn is_precondition(&self) -> bool {
        matches!(self, PlaybackError::NoSelection | PlaybackError::EmptyCatalog)
    }

    pub fn user_message(&self) -> String {
        match self {
            PlaybackError::Catalog(error) => error.user_message(),
            other => other.to_string(),
        }
    }
}

/// Result type for playback session operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
