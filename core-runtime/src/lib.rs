//! # Core Runtime Module
//!
//! Foundational infrastructure shared by every session-core crate:
//! - Logging and tracing setup
//! - Configuration (`CoreConfig`) and its builder
//! - The event bus that carries catalog, session, identity and toast events

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder, SeedPolicy};
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, Notice, NoticeLevel};
