use core_catalog::SongId;
use serde::{Deserialize, Serialize};

/// Coarse state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    NoSelection,
    Paused,
    Playing,
}

/// What is selected, where it sits in the catalog and whether it is playing.
///
/// `index` matches the position of `selected_song_id` in the catalog after
/// every navigation step and after any selection of a song the catalog holds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackSession {
    pub selected_song_id: Option<SongId>,
    pub index: usize,
    pub is_playing: bool,
}

impl PlaybackSession {
    pub fn status(&self) -> SessionStatus {
        match (&self.selected_song_id, self.is_playing) {
            (None, _) => SessionStatus::NoSelection,
            (Some(_), false) => SessionStatus::Paused,
            (Some(_), true) => SessionStatus::Playing,
        }
    }

    pub fn has_selection(&self) -> bool {
        self.selected_song_id.is_some()
    }
}
