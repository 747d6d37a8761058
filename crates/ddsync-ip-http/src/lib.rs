// # HTTP IP Source
//
// This crate provides the address observer for ddsync: it asks an external
// echo service (e.g. ifconfig.me, icanhazip.com) for the caller's public IP.
//
// Every call to `current()` is a live lookup. There is no cache and no retry;
// the engine's next tick is the retry.

use ddsync_core::config::IpSourceConfig;
use ddsync_core::traits::IpSource;
use ddsync_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default HTTP timeout for lookups
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL returning the caller's address as plain text (e.g. "https://ifconfig.me/ip")
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create with a custom per-request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create from configuration
    pub fn from_config(config: &IpSourceConfig) -> Result<Self> {
        match config {
            IpSourceConfig::Http { url, timeout_secs } => {
                Self::with_timeout(url.clone(), Duration::from_secs(*timeout_secs))
            }
        }
    }

    /// The echo endpoint being queried
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::transport(format!("Error fetching public IP: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::transport(format!(
                "Error fetching public IP: HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Error reading response body: {}", e)))?;

        let ip_text = body.trim();

        // Anything that is not an address (captive portals, error pages) must never reach DNS
        if ip_text.parse::<IpAddr>().is_err() {
            return Err(Error::protocol(format!(
                "Echo service returned an invalid IP address: {:?}",
                ip_text.chars().take(64).collect::<String>()
            )));
        }

        tracing::debug!("Public IP from {}: {}", self.url, ip_text);
        Ok(ip_text.to_string())
    }
}
