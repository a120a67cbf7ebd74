//! # API Client
//!
//! HTTP client for calling services that answer with the response envelope.
//!
//! Successful envelopes yield their `data`; error envelopes are turned back
//! into the matching [`AppError`], so a `403` from a downstream service
//! surfaces as [`AppError::Forbidden`] with the downstream message.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use lib_web::ApiClient;
//! use serde_json::Value;
//!
//! # async fn example() -> lib_core::Result<()> {
//! let client = ApiClient::builder("http://127.0.0.1:8080")
//!     .timeout(Duration::from_secs(5))
//!     .build()?
//!     .with_token("eyJ...");
//!
//! let me: Value = client.get("/api/auth/me").await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use lib_core::{ApiResponse, AppError, Config, Result};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION},
    Client, Method, RequestBuilder,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON client bound to one base URL.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Builder for [`ApiClient`].
#[derive(Debug)]
pub struct ApiClientBuilder {
    base_url: String,
    timeout: Duration,
    headers: HeaderMap,
}

impl ApiClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Header sent with every request.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::Config(format!("invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| AppError::Config(format!("invalid value for header {}: {}", name, e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn build(self) -> Result<ApiClient> {
        let client = Client::builder()
            .timeout(self.timeout)
            .default_headers(self.headers)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(ApiClient {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }
}

impl ApiClient {
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            headers: HeaderMap::new(),
        }
    }

    /// Client using the configured outbound timeout.
    pub fn from_config(base_url: impl Into<String>, config: &Config) -> Result<Self> {
        Self::builder(base_url).timeout(config.timeout()).build()
    }

    /// Copy of this client that sends `Authorization: Bearer <token>`.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // region:    --- Requests

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.request(Method::DELETE, path)).await
    }

    // endregion: --- Requests

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport_error)?;

        debug!("[CLIENT] {} ({} bytes)", status, bytes.len());

        let envelope: ApiResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(AppError::External(format!("undecodable response body: {}", e)));
            }
            Err(_) => {
                let text = String::from_utf8_lossy(&bytes);
                warn!("[CLIENT] Non-envelope error response: {} {}", status, text);
                return Err(AppError::from_status(status, text));
            }
        };

        if !envelope.success {
            return Err(match envelope.error {
                Some(body) => AppError::from_body(body),
                None => AppError::from_status(status, "request failed"),
            });
        }

        match envelope.data {
            Some(data) => Ok(data),
            // Lets `()` and `Option<_>` targets accept envelopes without data.
            None => serde_json::from_value(Value::Null)
                .map_err(|_| AppError::External("response envelope has no data".to_string())),
        }
    }
}

fn transport_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout(err.to_string())
    } else {
        AppError::External(err.to_string())
    }
}
