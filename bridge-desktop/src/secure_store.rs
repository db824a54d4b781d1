//! Secure Credential Storage using OS Keychain

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SecureStore,
};
use keyring::Entry;
use tracing::{debug, error};

/// Keyring-based secure storage implementation
///
/// Uses platform-specific secure storage:
/// - macOS: Keychain
/// - Windows: Credential Manager (DPAPI)
/// - Linux: Secret Service (libsecret)
///
/// Keyring entries hold strings, so only UTF-8 secrets are accepted.
pub struct KeyringSecureStore {
    service_name: String,
}

impl KeyringSecureStore {
    /// Create a new secure store with default service name
    pub fn new() -> Self {
        Self {
            service_name: "melodia-core".to_string(),
        }
    }

    /// Create a new secure store with custom service name
    pub fn with_service_name(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn get_entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service_name, key).map_err(Self::map_keyring_error)
    }

    fn map_keyring_error(e: keyring::Error) -> BridgeError {
        BridgeError::OperationFailed(format!("Keyring error: {}", e))
    }
}

impl Default for KeyringSecureStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecureStore for KeyringSecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(value).map_err(|e| {
            BridgeError::OperationFailed(format!("Secret is not valid UTF-8: {}", e))
        })?;

        self.get_entry(key)?
            .set_password(text)
            .map_err(Self::map_keyring_error)?;

        debug!(key = key, "Stored secret in keyring");
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.get_entry(key)?.get_password() {
            Ok(text) => {
                debug!(key = key, "Retrieved secret from keyring");
                Ok(Some(text.into_bytes()))
            }
            Err(keyring::Error::NoEntry) => {
                debug!(key = key, "Secret not found in keyring");
                Ok(None)
            }
            Err(e) => {
                error!(key = key, error = %e, "Failed to read secret");
                Err(Self::map_keyring_error(e))
            }
        }
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        match self.get_entry(key)?.delete_credential() {
            Ok(_) => {
                debug!(key = key, "Deleted secret from keyring");
                Ok(())
            }
            // Already gone
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Self::map_keyring_error(e)),
        }
    }
}
