//! # Catalog Module
//!
//! Holds the song and album catalog fetched from the remote catalog service.
//!
//! ## Overview
//!
//! This module manages:
//! - Song/Album domain models and their identifiers
//! - The `CatalogGateway` seam to the remote service
//! - Sequence-tagged request slots so stale responses never overwrite newer data
//! - `CatalogStore`, the single owner of catalog state

pub mod error;
pub mod gateway;
pub mod models;
pub mod slot;
pub mod store;

pub use error::{CatalogError, Resource, Result};
pub use gateway::CatalogGateway;
pub use models::{Album, AlbumDetail, AlbumId, Song, SongId};
pub use slot::{Fetched, RequestSlot, Ticket};
pub use store::CatalogStore;
