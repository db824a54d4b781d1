//! Remote catalog seam.

use crate::models::{Album, AlbumDetail, AlbumId, Song, SongId};
use async_trait::async_trait;
use bridge_traits::error::Result;

/// Read-only access to the remote catalog service.
///
/// Implementations make exactly one attempt per call and report either a
/// transport failure or a server rejection through `BridgeError`.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn songs(&self) -> Result<Vec<Song>>;

    async fn albums(&self) -> Result<Vec<Album>>;

    async fn song(&self, id: SongId) -> Result<Song>;

    async fn album_with_songs(&self, id: AlbumId) -> Result<AlbumDetail>;
}
