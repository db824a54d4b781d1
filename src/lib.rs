//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (chiefly `core-service`). Host applications can depend on
//! `melodia-workspace`, enable `desktop-shims`, and reach the whole session
//! core through the re-exported service.

pub use core_service::*;
