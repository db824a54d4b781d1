//! Auth Token Storage
//!
//! Persists the single auth token under a fixed key through the host
//! `SecureStore` (keychain on desktop, local storage in browsers).
//!
//! - Token values are never logged or included in errors
//! - A value that is not valid UTF-8 is treated as corrupted and removed
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::{AuthToken, TokenStore};
//! use std::sync::Arc;
//! # use bridge_traits::storage::SecureStore;
//! # async fn example(secure_store: Arc<dyn SecureStore>) -> core_auth::Result<()> {
//! let token_store = TokenStore::new(secure_store, "token");
//!
//! token_store.save(&AuthToken::new("opaque")).await?;
//! let token = token_store.load().await?;
//! token_store.delete().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::AuthToken;
use bridge_traits::storage::SecureStore;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct TokenStore {
    secure_store: Arc<dyn SecureStore>,
    key: String,
}

impl TokenStore {
    pub fn new(secure_store: Arc<dyn SecureStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        debug!(key = %key, "Initializing TokenStore");
        Self { secure_store, key }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stores the token, overwriting any previous one.
    pub async fn save(&self, token: &AuthToken) -> Result<()> {
        self.secure_store
            .set_secret(&self.key, token.as_str().as_bytes())
            .await
            .map_err(|e| {
                warn!(key = %self.key, error = %e, "Failed to persist auth token");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        info!(key = %self.key, "Auth token persisted");
        Ok(())
    }

    /// Returns:
    /// - `Ok(Some(token))` when a usable token is stored
    /// - `Ok(None)` when nothing (or only whitespace) is stored
    /// - `Err` when the store is unavailable or the value is corrupted
    pub async fn load(&self) -> Result<Option<AuthToken>> {
        let data = self.secure_store.get_secret(&self.key).await.map_err(|e| {
            warn!(key = %self.key, error = %e, "Failed to read auth token");
            AuthError::SecureStorageUnavailable(e.to_string())
        })?;

        let Some(data) = data else {
            debug!(key = %self.key, "No auth token stored");
            return Ok(None);
        };

        let token = match String::from_utf8(data) {
            Ok(value) => AuthToken::new(value),
            Err(e) => {
                warn!(key = %self.key, "Stored auth token is not valid UTF-8");

                if let Err(delete_err) = self.secure_store.delete_secret(&self.key).await {
                    warn!(
                        key = %self.key,
                        error = %delete_err,
                        "Failed to delete corrupted auth token"
                    );
                }

                return Err(AuthError::TokenCorrupted(e.utf8_error().to_string()));
            }
        };

        if token.is_blank() {
            return Ok(None);
        }
        Ok(Some(token))
    }

    /// Removes the token. Succeeds when nothing is stored.
    pub async fn delete(&self) -> Result<()> {
        self.secure_store.delete_secret(&self.key).await.map_err(|e| {
            warn!(key = %self.key, error = %e, "Failed to delete auth token");
            AuthError::SecureStorageUnavailable(e.to_string())
        })?;

        info!(key = %self.key, "Auth token deleted");
        Ok(())
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore").field("key", &self.key).finish()
    }
}
