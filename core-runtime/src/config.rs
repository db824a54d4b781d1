//! # Core Configuration Module
//!
//! Provides configuration management for the session core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! holding every dependency and setting the stores need. `build()` fails fast
//! with actionable messages when a required bridge or endpoint is missing.
//!
//! ## Required
//!
//! - `catalog_api_url` - base URL of the song/album service
//! - `user_api_url` - base URL of the user service
//! - `HttpClient` - one-shot HTTP transport (desktop default: reqwest)
//! - `SecureStore` - auth token persistence (desktop default: keyring)
//!
//! When the `desktop-shims` feature is enabled, desktop-ready bridges are
//! injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, SeedPolicy};
//!
//! let config = CoreConfig::builder()
//!     .catalog_api_url("http://localhost:8000")
//!     .user_api_url("http://localhost:5000")
//!     .seed_policy(SeedPolicy::Once)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{HttpClient, SecureStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Route the presentation layer navigates to after a successful sign-in.
pub const DEFAULT_LANDING_ROUTE: &str = "/";

/// Fixed key under which the auth token is persisted.
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// When a successful song-list load re-seeds the playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Seed from the first catalog entry at the first non-empty load only.
    #[default]
    Once,
    /// Reset selection to the first entry after every non-empty load.
    EveryLoad,
}

#[derive(Clone)]
pub struct CoreConfig {
    /// Base URL of the catalog (songs/albums) service
    pub catalog_api_url: String,

    /// Base URL of the user (auth/playlist) service
    pub user_api_url: String,

    /// Timeout applied to every gateway request
    pub request_timeout: Duration,

    pub seed_policy: SeedPolicy,

    /// Capacity of the event bus broadcast channel
    pub event_buffer_size: usize,

    pub landing_route: String,

    pub token_key: String,

    pub http_client: Arc<dyn HttpClient>,

    pub secure_store: Arc<dyn SecureStore>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("catalog_api_url", &self.catalog_api_url)
            .field("user_api_url", &self.user_api_url)
            .field("request_timeout", &self.request_timeout)
            .field("seed_policy", &self.seed_policy)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("landing_route", &self.landing_route)
            .field("token_key", &self.token_key)
            .field("http_client", &"HttpClient { ... }")
            .field("secure_store", &"SecureStore { ... }")
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        validate_base_url("catalog_api_url", &self.catalog_api_url)?;
        validate_base_url("user_api_url", &self.user_api_url)?;

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than zero".to_string(),
            ));
        }

        if self.token_key.trim().is_empty() {
            return Err(Error::Config("Token key cannot be empty".to_string()));
        }

        if !self.landing_route.starts_with('/') {
            return Err(Error::Config(format!(
                "Landing route must be an absolute path, got '{}'",
                self.landing_route
            )));
        }

        Ok(())
    }
}

fn validate_base_url(field: &str, url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(Error::Config(format!("{} cannot be empty", field)));
    }

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::Config(format!(
            "{} must start with http:// or https://, got '{}'",
            field, url
        )));
    }

    Ok(())
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP client implementation provided. \
                 Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
                 Other hosts: inject a platform-native adapter."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn secure_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SecureStore".to_string(),
        message: "SecureStore implementation is required for auth token persistence. \
                 Desktop: enable the 'desktop-shims' feature to use the default KeyringSecureStore. \
                 Web: inject a localStorage-backed store."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_timeout(timeout)
        .map_err(|e| Error::Internal(format!("Failed to initialize default HttpClient: {}", e)))?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    use bridge_desktop::KeyringSecureStore;

    let store: Arc<dyn SecureStore> = Arc::new(KeyringSecureStore::new());
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    Err(secure_store_missing_error())
}

#[derive(Default)]
pub struct CoreConfigBuilder {
    catalog_api_url: Option<String>,
    user_api_url: Option<String>,
    request_timeout: Option<Duration>,
    seed_policy: SeedPolicy,
    event_buffer_size: Option<usize>,
    landing_route: Option<String>,
    token_key: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    secure_store: Option<Arc<dyn SecureStore>>,
}

impl CoreConfigBuilder {
    pub fn catalog_api_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_api_url = Some(url.into());
        self
    }

    pub fn user_api_url(mut self, url: impl Into<String>) -> Self {
        self.user_api_url = Some(url.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn seed_policy(mut self, policy: SeedPolicy) -> Self {
        self.seed_policy = policy;
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn landing_route(mut self, route: impl Into<String>) -> Self {
        self.landing_route = Some(route.into());
        self
    }

    pub fn token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = Some(key.into());
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    pub fn build(self) -> Result<CoreConfig> {
        let catalog_api_url = self.catalog_api_url.ok_or_else(|| {
            Error::Config(
                "Catalog API URL is required. Use .catalog_api_url() to set it.".to_string(),
            )
        })?;

        let user_api_url = self.user_api_url.ok_or_else(|| {
            Error::Config("User API URL is required. Use .user_api_url() to set it.".to_string())
        })?;

        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let secure_store = match self.secure_store {
            Some(store) => store,
            None => provide_default_secure_store()?,
        };

        let config = CoreConfig {
            catalog_api_url: catalog_api_url.trim_end_matches('/').to_string(),
            user_api_url: user_api_url.trim_end_matches('/').to_string(),
            request_timeout,
            seed_policy: self.seed_policy,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            landing_route: self
                .landing_route
                .unwrap_or_else(|| DEFAULT_LANDING_ROUTE.to_string()),
            token_key: self
                .token_key
                .unwrap_or_else(|| DEFAULT_TOKEN_KEY.to_string()),
            http_client,
            secure_store,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use bridge_traits::BridgeError;

    struct MockSecureStore;

    #[async_trait]
    impl SecureStore for MockSecureStore {
        async fn set_secret(&self, _key: &str, _value: &[u8]) -> BridgeResult<()> {
            Ok(())
        }

        async fn get_secret(&self, _key: &str) -> BridgeResult<Option<Vec<u8>>> {
            Ok(None)
        }

        async fn delete_secret(&self, _key: &str) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct MockHttpClient;

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Err(BridgeError::NotAvailable("mock".to_string()))
        }
    }

    fn complete_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .catalog_api_url("http://localhost:8000")
            .user_api_url("http://localhost:5000/")
            .http_client(Arc::new(MockHttpClient))
            .secure_store(Arc::new(MockSecureStore))
    }

    #[test]
    fn test_build_with_defaults() {
        let config = complete_builder().build().unwrap();

        assert_eq!(config.catalog_api_url, "http://localhost:8000");
        assert_eq!(config.user_api_url, "http://localhost:5000");
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.seed_policy, SeedPolicy::Once);
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert_eq!(config.landing_route, "/");
        assert_eq!(config.token_key, "token");
    }

    #[test]
    fn test_build_with_overrides() {
        let config = complete_builder()
            .seed_policy(SeedPolicy::EveryLoad)
            .request_timeout(Duration::from_secs(5))
            .event_buffer_size(16)
            .landing_route("/home")
            .token_key("auth-token")
            .build()
            .unwrap();

        assert_eq!(config.seed_policy, SeedPolicy::EveryLoad);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.event_buffer_size, 16);
        assert_eq!(config.landing_route, "/home");
        assert_eq!(config.token_key, "auth-token");
    }

    #[test]
    fn test_missing_catalog_url() {
        let result = CoreConfig::builder()
            .user_api_url("http://localhost:5000")
            .http_client(Arc::new(MockHttpClient))
            .secure_store(Arc::new(MockSecureStore))
            .build();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Catalog API URL is required"));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = complete_builder()
            .catalog_api_url("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("catalog_api_url"));
    }

    #[test]
    fn test_rejects_zero_timeout_and_buffer() {
        assert!(complete_builder()
            .request_timeout(Duration::ZERO)
            .build()
            .is_err());
        assert!(complete_builder().event_buffer_size(0).build().is_err());
    }

    #[test]
    fn test_rejects_relative_landing_route() {
        let err = complete_builder().landing_route("home").build().unwrap_err();
        assert!(err.to_string().contains("Landing route"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_secure_store_without_shims() {
        let result = CoreConfig::builder()
            .catalog_api_url("http://localhost:8000")
            .user_api_url("http://localhost:5000")
            .http_client(Arc::new(MockHttpClient))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "SecureStore");
            }
            other => panic!("expected CapabilityMissing, got {:?}", other.map(|_| ())),
        }
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_http_client_without_shims() {
        let result = CoreConfig::builder()
            .catalog_api_url("http://localhost:8000")
            .user_api_url("http://localhost:5000")
            .secure_store(Arc::new(MockSecureStore))
            .build();

        assert!(matches!(
            result,
            Err(Error::CapabilityMissing { ref capability, .. }) if capability == "HttpClient"
        ));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_desktop_shims_provide_bridges() {
        let config = CoreConfig::builder()
            .catalog_api_url("http://localhost:8000")
            .user_api_url("http://localhost:5000")
            .build()
            .unwrap();

        assert_eq!(config.token_key, DEFAULT_TOKEN_KEY);
    }

    #[test]
    fn test_seed_policy_serde() {
        let json = serde_json::to_string(&SeedPolicy::EveryLoad).unwrap();
        assert_eq!(json, "\"every_load\"");
        let parsed: SeedPolicy = serde_json::from_str("\"once\"").unwrap();
        assert_eq!(parsed, SeedPolicy::Once);
    }
}
