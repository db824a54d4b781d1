//! Playlist View
//!
//! The signed-in user's saved songs, in catalog order. Derived from the
//! catalog and the saved-id set; never writes to either.

use core_auth::IdentityStore;
use core_catalog::{CatalogStore, Song, SongId};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Songs whose id is in `saved_ids`, preserving the order of `songs`.
pub fn playlist_view(songs: &[Song], saved_ids: &HashSet<SongId>) -> Vec<Song> {
    if saved_ids.is_empty() {
        return Vec::new();
    }
    songs
        .iter()
        .filter(|song| saved_ids.contains(&song.id))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SourceGenerations {
    catalog: u64,
    identity: u64,
}

#[derive(Debug)]
struct Cached {
    sources: SourceGenerations,
    songs: Arc<[Song]>,
}

/// Memoised playlist, recomputed when the song list or the user changes.
pub struct PlaylistView {
    catalog: Arc<CatalogStore>,
    identity: Arc<IdentityStore>,
    cache: Mutex<Option<Cached>>,
}

impl PlaylistView {
    pub fn new(catalog: Arc<CatalogStore>, identity: Arc<IdentityStore>) -> Self {
        Self {
            catalog,
            identity,
            cache: Mutex::new(None),
        }
    }

    pub fn songs(&self) -> Arc<[Song]> {
        // Generations before data: a racing change can only leave the key stale.
        let sources = SourceGenerations {
            catalog: self.catalog.generation(),
            identity: self.identity.generation(),
        };

        let mut cache = self.cache.lock();
        if let Some(cached) = cache.as_ref().filter(|c| c.sources == sources) {
            return Arc::clone(&cached.songs);
        }

        let songs: Arc<[Song]> =
            playlist_view(&self.catalog.songs(), &self.identity.saved_ids()).into();
        trace!(count = songs.len(), "Playlist view recomputed");

        *cache = Some(Cached {
            sources,
            songs: Arc::clone(&songs),
        });
        songs
    }

    pub fn len(&self) -> usize {
        self.songs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs().is_empty()
    }
}

impl fmt::Debug for PlaylistView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaylistView")
            .field("cached", &self.cache.lock().as_ref().map(|c| c.sources))
            .finish()
    }
}
