//! Domain models for the catalog
//!
//! Songs and albums are immutable once fetched; a re-fetch replaces them
//! wholesale.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ID Types
// =============================================================================

/// Opaque, stable identifier for a song
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(String);

impl SongId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SongId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SongId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Opaque, stable identifier for an album
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlbumId(String);

impl AlbumId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AlbumId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AlbumId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// =============================================================================
// Domain Models
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub description: String,
    /// Thumbnail image reference
    pub thumbnail: String,
    /// Audio resource reference handed to the media element
    pub audio: String,
    pub album_id: AlbumId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
}

/// One album plus its songs, fetched per album id.
///
/// Kept apart from the global song list; never merged into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumDetail {
    pub album: Album,
    pub songs: Vec<Song>,
}
