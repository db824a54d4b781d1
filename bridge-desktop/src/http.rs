//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// `HttpClient` backed by a pooled `reqwest::Client`.
///
/// Every request is attempted exactly once. Failing to obtain a response is
/// reported as [`BridgeError::Transport`]; any response, whatever its status,
/// is handed back to the caller.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("melodia-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BridgeError::NotAvailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    fn map_send_error(e: reqwest::Error) -> BridgeError {
        if e.is_timeout() {
            BridgeError::Transport("Request timed out".to_string())
        } else if e.is_connect() {
            BridgeError::Transport(format!("Connection failed: {}", e))
        } else {
            BridgeError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = ?request.method, url = %request.url, "Executing HTTP request");

        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "HTTP request failed");
                Self::map_send_error(e)
            })?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = response.bytes().await.map_err(Self::map_send_error)?;

        debug!(status, bytes = body.len(), "HTTP response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
