//! HTTP Client Abstraction
//!
//! Provides async HTTP operations. Implementations perform exactly one attempt
//! per request; retrying is left to whoever re-invokes the operation.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{BridgeError, Result};

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let json = serde_json::to_vec(body).map_err(|e| {
            BridgeError::OperationFailed(format!("JSON serialization failed: {}", e))
        })?;
        self.body = Some(Bytes::from(json));
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// HTTP response
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Parse response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            BridgeError::OperationFailed(format!("JSON deserialization failed: {}", e))
        })
    }

    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Async HTTP client trait
///
/// This trait abstracts HTTP operations to allow platform-specific implementations.
/// A non-2xx answer is still a successful `execute`: interpreting statuses is the
/// caller's job. Only failures to obtain a response at all are errors, and
/// those should be reported as [`BridgeError::Transport`].
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpRequest, HttpMethod};
///
/// async fn fetch_data(client: &dyn HttpClient) -> Result<String> {
///     let request = HttpRequest::new(HttpMethod::Get, "https://api.example.com/data")
///         .header("token", "abc");
///
///     let response = client.execute(request).await?;
///     response.json::<String>()
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network connection fails
    /// - TLS validation fails
    /// - Request times out
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}
