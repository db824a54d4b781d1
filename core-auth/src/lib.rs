//! # Identity Module
//!
//! Owns the signed-in user, their auth token and their saved-song list.
//!
//! ## Overview
//!
//! This module provides:
//! - The `User` model and the credential payloads sent to the user service
//! - The `IdentityGateway` seam to the remote user service
//! - `TokenStore`, which persists the single auth token through a `SecureStore`
//! - `IdentityStore`, handling login/register/restore/logout and playlist toggles

pub mod error;
pub mod gateway;
pub mod manager;
pub mod token_store;
pub mod types;

pub use error::{AuthError, AuthOperation, Result};
pub use gateway::IdentityGateway;
pub use manager::IdentityStore;
pub use token_store::TokenStore;
pub use types::{
    AuthResponse, AuthToken, LoginRequest, PlaylistToggle, RegisterRequest, SignedIn, User, UserId,
};
