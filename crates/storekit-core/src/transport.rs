//! Request dispatch shared by both clients
//!
//! Key properties:
//! - Redirects are never followed; a signed request is bound to its path
//! - Certificate verification is on unless explicitly disabled
//! - Exactly one attempt per call, no retries
//! - Every non-2xx answer is classified into a distinct [`StoreError`]

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::decode::{ErrorFormat, decode_error};
use crate::error::{Result, StoreError};

fn default_timeout_secs() -> u64 {
    30
}

/// TLS and timeout settings for a client's HTTP transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportSettings {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra CA bundle (PEM) trusted in addition to the built-in roots
    #[serde(default)]
    pub ca_bundle: Option<PathBuf>,

    /// Skip TLS verification (insecure, not recommended)
    #[serde(default)]
    pub insecure_skip_tls: bool,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            ca_bundle: None,
            insecure_skip_tls: false,
        }
    }
}

impl TransportSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a reqwest client, optionally presenting a client identity
    pub fn build_client(&self, identity: Option<reqwest::Identity>) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(self.timeout());

        if let Some(path) = &self.ca_bundle {
            let pem = std::fs::read(path)?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                StoreError::InvalidConfig {
                    message: format!("Invalid CA bundle {}: {}", path.display(), e),
                }
            })?;
            builder = builder.add_root_certificate(cert);
        }

        if self.insecure_skip_tls {
            tracing::warn!(
                "TLS certificate verification is DISABLED; responses can be intercepted"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(identity) = identity {
            builder = builder.identity(identity);
        }

        builder.build().map_err(|e| StoreError::InvalidConfig {
            message: format!("Failed to build HTTP client: {}", e),
        })
    }
}

/// Raw response of a successful call
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Sends requests against a base URL and classifies the answers
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    base_url: Url,
}

impl Dispatcher {
    /// Create a dispatcher for `base_url` using `settings`
    pub fn new(base_url: &str, settings: &TransportSettings) -> Result<Self> {
        let client = settings.build_client(None)?;
        Self::with_client(base_url, client)
    }

    /// Create a dispatcher around an already configured client
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| StoreError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(StoreError::InvalidUrl {
                url: base_url.to_string(),
                reason: "URL must start with http:// or https://".to_string(),
            });
        }

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for a path relative to the base URL
    pub fn url_for(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!("{}{}", self.base_url.path(), path.trim_start_matches('/'));
        url.set_path(&joined);
        url
    }

    /// Start a request for `path`
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url_for(path))
    }

    /// Send a request and return the buffered body of a 2xx answer
    pub async fn execute(
        &self,
        request: RequestBuilder,
        format: ErrorFormat,
    ) -> Result<RawResponse> {
        let response = self.send(request, format).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Send a request and hand back the live response of a 2xx answer.
    ///
    /// Used for downloads, where the body is consumed as a stream.
    pub async fn execute_stream(
        &self,
        request: RequestBuilder,
        format: ErrorFormat,
    ) -> Result<reqwest::Response> {
        self.send(request, format).await
    }

    async fn send(
        &self,
        request: RequestBuilder,
        format: ErrorFormat,
    ) -> Result<reqwest::Response> {
        let request = request.build()?;
        let method = request.method().clone();
        let url = request.url().clone();

        tracing::debug!("{} {}", method, url);
        let response = self.client.execute(request).await?;
        let status = response.status();
        tracing::debug!("{} {} -> {}", method, url, status.as_u16());

        if status.is_success() {
            return Ok(response);
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Failed to read error body from {}: {}", url, e);
                Bytes::new()
            }
        };
        Err(classify_failure(status, url.as_str(), &body, format))
    }
}

/// Map a non-2xx answer onto the error taxonomy
pub fn classify_failure(
    status: StatusCode,
    url: &str,
    body: &[u8],
    format: ErrorFormat,
) -> StoreError {
    match status.as_u16() {
        401 | 403 => StoreError::AuthFailed(decode_error(status, body, format)),
        400..=505 => StoreError::Service(decode_error(status, body, format)),
        other => StoreError::UnexpectedStatus {
            status: other,
            url: url.to_string(),
        },
    }
}
