use bridge_traits::error::BridgeError;
use std::fmt;
use thiserror::Error;

/// Fallback text when a catalog failure carries no server message.
pub const GENERIC_FAILURE_MESSAGE: &str = "An Error Occurred";

/// Which catalog slot a request targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Songs,
    Albums,
    AlbumDetail,
    SongDetail,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Songs => "songs",
            Resource::Albums => "albums",
            Resource::AlbumDetail => "album_detail",
            Resource::SongDetail => "song_detail",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to load {resource}: {source}")]
    Gateway {
        resource: Resource,
        #[source]
        source: BridgeError,
    },
}

impl CatalogError {
    pub fn resource(&self) -> Resource {
        match self {
            CatalogError::Gateway { resource, .. } => *resource,
        }
    }

    /// Server-supplied message when present, generic text otherwise.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Gateway { source, .. } => source
                .server_message()
                .unwrap_or(GENERIC_FAILURE_MESSAGE)
                .to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
