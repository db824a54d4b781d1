//! Process-local secret storage

use async_trait::async_trait;
use bridge_traits::{error::Result, storage::SecureStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// `SecureStore` that keeps secrets in memory for the lifetime of the process.
///
/// Suitable for tests and for hosts that deliberately do not persist
/// credentials between launches.
#[derive(Default)]
pub struct MemorySecureStore {
    secrets: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one secret.
    pub fn with_secret(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store.secrets.lock().insert(key.into(), value.into());
        store
    }

    pub fn len(&self) -> usize {
        self.secrets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.lock().is_empty()
    }
}

#[async_trait]
impl SecureStore for MemorySecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        self.secrets.lock().insert(key.to_string(), value.to_vec());
        debug!(key = key, "Stored secret in memory");
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.secrets.lock().get(key).cloned())
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        self.secrets.lock().remove(key);
        debug!(key = key, "Deleted secret from memory");
        Ok(())
    }
}
