//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` (single attempt, no automatic retry)
//! - `SecureStore` using the `keyring` crate
//! - `SecureStore` backed by process memory, for hosts without a keychain
//!
//! ## Feature Flags
//!
//! - `secure-store`: Enable OS keychain integration (default)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{KeyringSecureStore, ReqwestHttpClient};
//!
//! let http_client = ReqwestHttpClient::new()?;
//! let secure_store = KeyringSecureStore::new();
//! ```

mod http;
mod memory;

#[cfg(feature = "secure-store")]
mod secure_store;

pub use http::ReqwestHttpClient;
pub use memory::MemorySecureStore;

#[cfg(feature = "secure-store")]
pub use secure_store::KeyringSecureStore;
