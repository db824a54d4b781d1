//! Secure Storage Abstraction
//!
//! Small key-value secret store used to persist credentials across restarts.

use async_trait::async_trait;

use crate::error::Result;

/// Secure credential storage.
///
/// Desktop hosts back this with the OS keychain; browsers with local storage;
/// tests with an in-memory map.
#[async_trait]
pub trait SecureStore: Send + Sync {
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()>;

    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn delete_secret(&self, key: &str) -> Result<()>;

    async fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.get_secret(key).await?.is_some())
    }
}
