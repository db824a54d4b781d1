//! # REST Provider
//!
//! Remote data gateway for the catalog and user services.
//!
//! `RestGateway` implements both `CatalogGateway` and `IdentityGateway` on top
//! of the host `HttpClient`, translating wire payloads into domain models and
//! non-2xx answers into `BridgeError::Rejected`.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::RestGateway;
pub use error::{RestError, Result};
