//! # Playback Session Module
//!
//! Tracks what the listener has selected and whether it is playing.
//!
//! ## Overview
//!
//! This module handles:
//! - The `PlaybackSession` value (selected song, catalog index, playing flag)
//! - Seeding the session from the first catalog entry
//! - Explicit selection, next/previous navigation and the play/pause flag
//! - Fetching the detail record of the selected song
//!
//! Navigation never touches the network; it always works against the
//! catalog snapshot currently held by the `CatalogStore`.

pub mod error;
pub mod manager;
pub mod session;

pub use error::{PlaybackError, Result};
pub use manager::SessionManager;
pub use session::{PlaybackSession, SessionStatus};
