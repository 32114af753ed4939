use async_trait::async_trait;
use reqwest::{Client, Url, redirect};
use std::time::Duration;
use tokio::time::timeout;

use crate::error::{DedupError, ProbeError};

/// A single bounded-time reachability probe
///
/// Implementations perform exactly one request per call and return the response status.
/// Transport-level failures are reported as `ProbeError`; status interpretation is left to
/// the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlProbe: Send + Sync {
    async fn head_status(&self, url: &str) -> Result<u16, ProbeError>;
}

/// Configuration for the HTTP probe
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Accept self-signed and otherwise invalid TLS certificates
    pub accept_invalid_certs: bool,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: crate::config::DEFAULT_PROBE_TIMEOUT,
            accept_invalid_certs: true,
            user_agent: format!("camera-dedup/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HEAD-request probe backed by reqwest
///
/// Redirects are not followed so that 301/302 responses reach the status policy as-is.
pub struct HttpProbe {
    client: Client,
    config: HttpClientConfig,
}

impl HttpProbe {
    /// Create a new probe with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self, DedupError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .redirect(redirect::Policy::none())
            .user_agent(&config.user_agent)
            .build()
            .map_err(DedupError::from)?;

        Ok(Self { client, config })
    }

    /// Get the probe configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[async_trait]
impl UrlProbe for HttpProbe {
    async fn head_status(&self, url: &str) -> Result<u16, ProbeError> {
        let parsed = Url::parse(url).map_err(|e| ProbeError::InvalidUrl {
            url: url.to_string(),
            details: e.to_string(),
        })?;

        let request_future = self.client.head(parsed).send();

        let response = timeout(self.config.timeout, request_future)
            .await
            .map_err(|_| ProbeError::Timeout {
                url: url.to_string(),
                timeout_seconds: self.config.timeout.as_secs(),
            })?
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout {
                        url: url.to_string(),
                        timeout_seconds: self.config.timeout.as_secs(),
                    }
                } else {
                    ProbeError::Transport(e)
                }
            })?;

        Ok(response.status().as_u16())
    }
}
