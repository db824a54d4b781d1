//! Catalog Store
//!
//! Single owner of the song list, the album list and the two transient
//! detail slots. Readers get cheap snapshots; writers replace whole values.

use crate::error::{CatalogError, Resource, Result};
use crate::gateway::CatalogGateway;
use crate::models::{Album, AlbumDetail, AlbumId, Song, SongId};
use crate::slot::{Fetched, RequestSlot};
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Counts in-flight catalog fetches for the `is_loading` flag.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct CatalogStore {
    gateway: Arc<dyn CatalogGateway>,
    event_bus: EventBus,
    songs: RequestSlot<Arc<[Song]>>,
    albums: RequestSlot<Arc<[Album]>>,
    album_detail: RequestSlot<AlbumDetail>,
    song_detail: RequestSlot<Song>,
    in_flight: AtomicUsize,
}

impl CatalogStore {
    pub fn new(gateway: Arc<dyn CatalogGateway>, event_bus: EventBus) -> Self {
        Self {
            gateway,
            event_bus,
            songs: RequestSlot::new(),
            albums: RequestSlot::new(),
            album_detail: RequestSlot::new(),
            song_detail: RequestSlot::new(),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// True while a song, album or album-detail fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Current song list in catalog order. Empty until the first successful load.
    pub fn songs(&self) -> Arc<[Song]> {
        self.songs
            .get()
            .unwrap_or_else(|| Arc::from(Vec::<Song>::new()))
    }

    pub fn albums(&self) -> Arc<[Album]> {
        self.albums
            .get()
            .unwrap_or_else(|| Arc::from(Vec::<Album>::new()))
    }

    pub fn album_detail(&self) -> Option<AlbumDetail> {
        self.album_detail.get()
    }

    /// The "current detail" song, independent of the playback selection.
    pub fn song_detail(&self) -> Option<Song> {
        self.song_detail.get()
    }

    pub fn song(&self, id: &SongId) -> Option<Song> {
        self.songs().iter().find(|song| &song.id == id).cloned()
    }

    pub fn position_of(&self, id: &SongId) -> Option<usize> {
        self.songs().iter().position(|song| &song.id == id)
    }

    /// Bumped every time a new song list is applied.
    pub fn generation(&self) -> u64 {
        self.songs.version()
    }

    /// Fetches the full song list and replaces the stored one on success.
    ///
    /// Returns the applied snapshot so the caller can seed the session.
    /// This does not seed by itself; go through `CoreService::load_songs`
    /// to get the seed rule applied.
    #[instrument(skip(self))]
    pub async fn load_songs(&self) -> Result<Fetched<Arc<[Song]>>> {
        let _loading = LoadingGuard::enter(&self.in_flight);
        let request = async { self.gateway.songs().await.map(Arc::<[Song]>::from) };
        let fetched = self.fetch_into(Resource::Songs, &self.songs, request).await?;

        if let Fetched::Applied(songs) = &fetched {
            info!(count = songs.len(), "Song list loaded");
            self.emit(CatalogEvent::SongsLoaded { count: songs.len() });
        }
        Ok(fetched)
    }

    #[instrument(skip(self))]
    pub async fn load_albums(&self) -> Result<Fetched<Arc<[Album]>>> {
        let _loading = LoadingGuard::enter(&self.in_flight);
        let request = async { self.gateway.albums().await.map(Arc::<[Album]>::from) };
        let fetched = self
            .fetch_into(Resource::Albums, &self.albums, request)
            .await?;

        if let Fetched::Applied(albums) = &fetched {
            info!(count = albums.len(), "Album list loaded");
            self.emit(CatalogEvent::AlbumsLoaded {
                count: albums.len(),
            });
        }
        Ok(fetched)
    }

    /// Fetches one album with its songs into the transient album-detail slot.
    #[instrument(skip(self, album_id), fields(album_id = %album_id))]
    pub async fn load_album_detail(&self, album_id: AlbumId) -> Result<Fetched<AlbumDetail>> {
        let _loading = LoadingGuard::enter(&self.in_flight);
        let request = self.gateway.album_with_songs(album_id.clone());
        let fetched = self
            .fetch_into(Resource::AlbumDetail, &self.album_detail, request)
            .await?;

        if let Fetched::Applied(detail) = &fetched {
            debug!(song_count = detail.songs.len(), "Album detail loaded");
            self.emit(CatalogEvent::AlbumDetailLoaded {
                album_id: album_id.to_string(),
                song_count: detail.songs.len(),
            });
        }
        Ok(fetched)
    }

    /// Fetches one song's full record into the "current detail" slot.
    #[instrument(skip(self, song_id), fields(song_id = %song_id))]
    pub async fn load_song_detail(&self, song_id: SongId) -> Result<Fetched<Song>> {
        let request = self.gateway.song(song_id.clone());
        let fetched = self
            .fetch_into(Resource::SongDetail, &self.song_detail, request)
            .await?;

        if matches!(fetched, Fetched::Applied(_)) {
            debug!("Song detail loaded");
            self.emit(CatalogEvent::SongDetailLoaded {
                song_id: song_id.to_string(),
            });
        }
        Ok(fetched)
    }

    async fn fetch_into<T, F>(
        &self,
        resource: Resource,
        slot: &RequestSlot<T>,
        request: F,
    ) -> Result<Fetched<T>>
    where
        T: Clone,
        F: Future<Output = bridge_traits::error::Result<T>>,
    {
        let ticket = slot.begin();

        match request.await {
            Ok(value) => {
                if slot.complete(ticket, value.clone()) {
                    return Ok(Fetched::Applied(value));
                }
                debug!(
                    %resource,
                    sequence = ticket.sequence(),
                    "Dropping response superseded by a newer request"
                );
                self.emit(CatalogEvent::ResponseSuperseded {
                    resource: resource.to_string(),
                });
                Ok(Fetched::Superseded)
            }
            Err(source) if !slot.is_current(ticket) => {
                debug!(
                    %resource,
                    sequence = ticket.sequence(),
                    error = %source,
                    "Ignoring failure of a superseded request"
                );
                self.emit(CatalogEvent::ResponseSuperseded {
                    resource: resource.to_string(),
                });
                Ok(Fetched::Superseded)
            }
            Err(source) => {
                let error = CatalogError::Gateway { resource, source };
                warn!(%resource, error = %error, "Catalog fetch failed, keeping previous data");
                self.emit(CatalogEvent::LoadFailed {
                    resource: resource.to_string(),
                    message: error.user_message(),
                });
                Err(error)
            }
        }
    }

    fn emit(&self, event: CatalogEvent) {
        let _ = self.event_bus.emit(CoreEvent::Catalog(event));
    }
}

impl fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogStore")
            .field("songs", &self.songs().len())
            .field("albums", &self.albums().len())
            .field("generation", &self.generation())
            .field("is_loading", &self.is_loading())
            .finish()
    }
}
