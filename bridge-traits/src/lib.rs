//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the session core and the host it
//! runs in. Each trait represents a capability the core requires but does not
//! own:
//!
//! - [`HttpClient`](http::HttpClient) - one-shot async HTTP requests
//! - [`SecureStore`](storage::SecureStore) - persistence for the auth token
//! - [`LoggerSink`](logger::LoggerSink) - forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Remote calls
//! distinguish two failure kinds:
//!
//! - `BridgeError::Transport` - no response was obtained (unreachable, timeout)
//! - `BridgeError::Rejected` - the server answered non-2xx, possibly with a
//!   human-readable message
//!
//! The core treats both the same way: the operation failed and a message is
//! available for the user.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! behind `Arc` across async tasks.

pub mod error;
pub mod http;
pub mod logger;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use logger::{LogEntry, LogLevel, LoggerSink};
pub use storage::SecureStore;
