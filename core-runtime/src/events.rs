//! # Event Bus System
//!
//! Provides an event-driven architecture for the session core using `tokio::sync::broadcast`.
//! Stores publish typed events; the presentation layer subscribes to render
//! toasts, spinners and re-fetches without the stores knowing about it.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐    emit     ┌───────────┐
//! │ CatalogStore  ├────────────>│           │
//! └───────────────┘             │           │
//! ┌───────────────┐    emit     │ EventBus  │   subscribe   ┌──────────────┐
//! │ SessionManager├────────────>│ (broadcast├──────────────>│ Presentation │
//! └───────────────┘             │  channel) │               └──────────────┘
//! ┌───────────────┐    emit     │           │
//! │ IdentityStore ├────────────>│           │
//! └───────────────┘             └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, Notice};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus.emit(CoreEvent::Notification(Notice::success("User Logged Out"))).ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "User notification");
//! # }
//! ```
//!
//! ## Event Types
//!
//! ### Catalog Events
//! - `SongsLoaded` / `AlbumsLoaded`: a list fetch replaced the stored list
//! - `AlbumDetailLoaded` / `SongDetailLoaded`: a detail slot was filled
//! - `ResponseSuperseded`: a response arrived after a newer request and was dropped
//! - `LoadFailed`: a fetch failed; the previous data is retained
//!
//! ### Session Events
//! - `Seeded`: selection initialised from the first catalog entry
//! - `SelectionChanged`: selected song (and index) changed
//! - `PlayingChanged`: play/pause flag flipped
//!
//! ### Identity Events
//! - `SignedIn`, `Restored`, `SignedOut`, `PlaylistUpdated`, `AuthError`
//!
//! ### Notifications
//! - `Notice`: user-facing success/error message (toast)
//!
//! ## Error Handling
//!
//! `emit` fails only when nobody is subscribed. Stores ignore that failure:
//! an unobserved event is not an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Catalog(CatalogEvent),
    Session(SessionEvent),
    Identity(IdentityEvent),
    Notification(Notice),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Catalog(e) => e.description(),
            CoreEvent::Session(e) => e.description(),
            CoreEvent::Identity(e) => e.description(),
            CoreEvent::Notification(_) => "User notification",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Catalog(CatalogEvent::LoadFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Identity(IdentityEvent::AuthError { .. }) => EventSeverity::Error,
            CoreEvent::Notification(Notice {
                level: NoticeLevel::Error,
                ..
            }) => EventSeverity::Error,
            CoreEvent::Notification(_) => EventSeverity::Info,
            CoreEvent::Identity(IdentityEvent::SignedIn { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Catalog Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CatalogEvent {
    SongsLoaded { count: usize },
    AlbumsLoaded { count: usize },
    AlbumDetailLoaded { album_id: String, song_count: usize },
    SongDetailLoaded { song_id: String },
    /// A response lost the race against a newer request for the same slot.
    ResponseSuperseded { resource: String },
    LoadFailed { resource: String, message: String },
}

impl CatalogEvent {
    fn description(&self) -> &str {
        match self {
            CatalogEvent::SongsLoaded { .. } => "Song list loaded",
            CatalogEvent::AlbumsLoaded { .. } => "Album list loaded",
            CatalogEvent::AlbumDetailLoaded { .. } => "Album detail loaded",
            CatalogEvent::SongDetailLoaded { .. } => "Song detail loaded",
            CatalogEvent::ResponseSuperseded { .. } => "Stale response discarded",
            CatalogEvent::LoadFailed { .. } => "Catalog fetch failed",
        }
    }
}

// ============================================================================
// Session Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    Seeded {
        song_id: String,
    },
    SelectionChanged {
        song_id: String,
        index: usize,
    },
    PlayingChanged {
        song_id: String,
        is_playing: bool,
    },
}

impl SessionEvent {
    fn description(&self) -> &str {
        match self {
            SessionEvent::Seeded { .. } => "Session seeded from catalog",
            SessionEvent::SelectionChanged { .. } => "Selected song changed",
            SessionEvent::PlayingChanged { .. } => "Playing state changed",
        }
    }
}

// ============================================================================
// Identity Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum IdentityEvent {
    SignedIn { user_id: String },
    /// A persisted token was resolved to a user at startup.
    Restored { user_id: String },
    SignedOut,
    PlaylistUpdated { user_id: String, saved_count: usize },
    AuthError { message: String },
}

impl IdentityEvent {
    fn description(&self) -> &str {
        match self {
            IdentityEvent::SignedIn { .. } => "User signed in",
            IdentityEvent::Restored { .. } => "Session restored from token",
            IdentityEvent::SignedOut => "User signed out",
            IdentityEvent::PlaylistUpdated { .. } => "Saved songs updated",
            IdentityEvent::AuthError { .. } => "Authentication error",
        }
    }
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message meant for the user, rendered by the host as a toast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to core events.
///
/// Cloning is cheap; all clones share the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error when there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Shorthand for emitting a user-facing notice.
    pub fn notify(&self, notice: Notice) {
        let _ = self.emit(CoreEvent::Notification(notice));
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// Receiver wrapper with an optional filter predicate.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(10);
/// let notices = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Notification(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking receive. `None` means nothing matching is queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    /// Drains every queued event that passes the filter.
    pub fn drain(&mut self) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        while let Some(Ok(event)) = self.try_recv() {
            events.push(event);
        }
        events
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
