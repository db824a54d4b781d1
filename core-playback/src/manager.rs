//! Session State Manager
//!
//! Owns the single `PlaybackSession`. All reads of the catalog go through the
//! shared `CatalogStore` snapshot taken at the start of each operation.

use crate::error::{PlaybackError, Result};
use crate::session::{PlaybackSession, SessionStatus};
use core_catalog::{CatalogStore, Fetched, Song, SongId};
use core_runtime::config::SeedPolicy;
use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Debug, Default)]
struct SessionState {
    session: PlaybackSession,
    seeded: bool,
}

pub struct SessionManager {
    catalog: Arc<CatalogStore>,
    event_bus: EventBus,
    seed_policy: SeedPolicy,
    state: RwLock<SessionState>,
}

impl SessionManager {
    pub fn new(catalog: Arc<CatalogStore>, event_bus: EventBus, seed_policy: SeedPolicy) -> Self {
        Self {
            catalog,
            event_bus,
            seed_policy,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn snapshot(&self) -> PlaybackSession {
        self.state.read().session.clone()
    }

    pub fn selected_song_id(&self) -> Option<SongId> {
        self.state.read().session.selected_song_id.clone()
    }

    /// Catalog record of the selected song, if the catalog holds it.
    pub fn selected_song(&self) -> Option<Song> {
        self.selected_song_id()
            .and_then(|id| self.catalog.song(&id))
    }

    pub fn index(&self) -> usize {
        self.state.read().session.index
    }

    pub fn is_playing(&self) -> bool {
        self.state.read().session.is_playing
    }

    pub fn status(&self) -> SessionStatus {
        self.state.read().session.status()
    }

    pub fn is_seeded(&self) -> bool {
        self.state.read().seeded
    }

    /// Whether `index` currently points at the selected song.
    ///
    /// False after selecting a song the catalog does not hold, or after a
    /// catalog reload moved the selected song.
    pub fn index_in_sync(&self) -> bool {
        let session = self.snapshot();
        let Some(selected) = session.selected_song_id else {
            return true;
        };
        self.catalog
            .songs()
            .get(session.index)
            .is_some_and(|song| song.id == selected)
    }

    /// Points the session at the first song of a freshly loaded list.
    ///
    /// Under `SeedPolicy::Once` only the first non-empty list seeds; under
    /// `SeedPolicy::EveryLoad` every non-empty list does. Returns whether the
    /// session was reset.
    pub fn seed(&self, songs: &[Song]) -> bool {
        let Some(first) = songs.first() else {
            debug!("Empty song list, session left unseeded");
            return false;
        };

        {
            let mut state = self.state.write();
            if state.seeded && self.seed_policy == SeedPolicy::Once {
                return false;
            }
            state.session = PlaybackSession {
                selected_song_id: Some(first.id.clone()),
                index: 0,
                is_playing: false,
            };
            state.seeded = true;
        }

        info!(song_id = %first.id, "Session seeded from catalog");
        self.emit(SessionEvent::Seeded {
            song_id: first.id.to_string(),
        });
        true
    }

    /// Selects a song by id and pauses.
    ///
    /// The index is recomputed from the current catalog. When the catalog does
    /// not hold the id, the index keeps its previous value and
    /// [`index_in_sync`](Self::index_in_sync) turns false.
    pub fn select_song(&self, id: SongId) {
        let position = self.catalog.position_of(&id);

        let index = {
            let mut state = self.state.write();
            match position {
                Some(position) => state.session.index = position,
                None => debug!(song_id = %id, "Selected song not in catalog, index unchanged"),
            }
            state.session.selected_song_id = Some(id.clone());
            state.session.is_playing = false;
            state.session.index
        };

        debug!(song_id = %id, index, "Song selected");
        self.emit(SessionEvent::SelectionChanged {
            song_id: id.to_string(),
            index,
        });
    }

    /// Sets the playing flag.
    ///
    /// With nothing selected, `true` is rejected with `NoSelection` and
    /// `false` is a no-op.
    pub fn set_playing(&self, playing: bool) -> Result<()> {
        let song_id = {
            let mut state = self.state.write();
            let Some(song_id) = state.session.selected_song_id.clone() else {
                return if playing {
                    Err(PlaybackError::NoSelection)
                } else {
                    Ok(())
                };
            };
            if state.session.is_playing == playing {
                return Ok(());
            }
            state.session.is_playing = playing;
            song_id
        };

        debug!(song_id = %song_id, playing, "Playing flag changed");
        self.emit(SessionEvent::PlayingChanged {
            song_id: song_id.to_string(),
            is_playing: playing,
        });
        Ok(())
    }

    /// Flips the playing flag and returns the new value.
    pub fn toggle_playing(&self) -> Result<bool> {
        let playing = !self.is_playing();
        self.set_playing(playing)?;
        Ok(playing)
    }

    /// Selects `id` and starts playing it.
    pub fn play_song(&self, id: SongId) -> Result<()> {
        self.select_song(id);
        self.set_playing(true)
    }

    /// Advances to the next song, wrapping from the last entry to the first.
    ///
    /// The playing flag is left as it is.
    pub fn next(&self) -> Result<SongId> {
        let songs = self.catalog.songs();
        if songs.is_empty() {
            return Err(PlaybackError::EmptyCatalog);
        }

        let (index, song_id) = {
            let mut state = self.state.write();
            let current = state.session.index.min(songs.len() - 1);
            let index = (current + 1) % songs.len();
            let song_id = songs[index].id.clone();
            state.session.index = index;
            state.session.selected_song_id = Some(song_id.clone());
            (index, song_id)
        };

        debug!(song_id = %song_id, index, "Moved to next song");
        self.emit(SessionEvent::SelectionChanged {
            song_id: song_id.to_string(),
            index,
        });
        Ok(song_id)
    }

    /// Steps back one song. At index 0 nothing changes and `None` is returned.
    pub fn previous(&self) -> Result<Option<SongId>> {
        let songs = self.catalog.songs();
        if songs.is_empty() {
            return Err(PlaybackError::EmptyCatalog);
        }

        let (index, song_id) = {
            let mut state = self.state.write();
            let current = state.session.index.min(songs.len() - 1);
            if current == 0 {
                return Ok(None);
            }
            let index = current - 1;
            let song_id = songs[index].id.clone();
            state.session.index = index;
            state.session.selected_song_id = Some(song_id.clone());
            (index, song_id)
        };

        debug!(song_id = %song_id, index, "Moved to previous song");
        self.emit(SessionEvent::SelectionChanged {
            song_id: song_id.to_string(),
            index,
        });
        Ok(Some(song_id))
    }

    /// Loads the detail record of the selected song into the catalog's
    /// "current detail" slot. `Ok(None)` when nothing is selected.
    #[instrument(skip(self))]
    pub async fn fetch_selected_detail(&self) -> Result<Option<Fetched<Song>>> {
        let Some(song_id) = self.selected_song_id() else {
            debug!("No selection, skipping detail fetch");
            return Ok(None);
        };

        let fetched = self.catalog.load_song_detail(song_id).await?;
        Ok(Some(fetched))
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_bus.emit(CoreEvent::Session(event));
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("SessionManager")
            .field("session", &state.session)
            .field("seeded", &state.seeded)
            .field("seed_policy", &self.seed_policy)
            .finish()
    }
}
