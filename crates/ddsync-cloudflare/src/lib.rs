// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `DnsProvider` for ddsync.
//
// ## Behavior
//
// - Lists every record of one zone, following pagination
// - Overwrites a record with a full `{type, name, content, ttl, proxied}` body
// - One HTTP request per page or per write; no retry, no caching
// - Lenient writes (default) ignore the response; strict writes classify it
// - Dry-run mode logs the intended PUT instead of sending it
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Construction fails if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records?page=N&per_page=M`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddsync_core::config::{DEFAULT_CLOUDFLARE_API_BASE, ProviderConfig, WriteVerification};
use ddsync_core::record::{DnsRecord, RecordUpdate};
use ddsync_core::traits::DnsProvider;
use ddsync_core::{Error, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Records requested per page (Cloudflare maximum for this endpoint is 5000, default 100)
const RECORDS_PER_PAGE: u32 = 100;

/// Envelope of the list endpoint: `{result, success, errors, result_info}`
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    result: Option<Vec<DnsRecord>>,
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

/// Envelope of the update endpoint; `result` is not inspected
#[derive(Debug, Deserialize)]
struct WriteResponse {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default = "first_page")]
    page: u32,
    #[serde(default = "first_page")]
    total_pages: u32,
}

fn first_page() -> u32 {
    1
}

/// An entry of the `errors` array: a bare string or a `{code, message}` object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiMessage {
    Detailed { code: i64, message: String },
    Text(String),
}

impl fmt::Display for ApiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiMessage::Detailed { code, message } => write!(f, "{code}: {message}"),
            ApiMessage::Text(text) => f.write_str(text),
        }
    }
}

/// Human-readable explanation of a non-success status
fn describe_status(status: StatusCode, body: &str) -> String {
    match status.as_u16() {
        401 | 403 => format!(
            "Authentication failed: Invalid API token or insufficient permissions. Status: {status}"
        ),
        404 => format!("Zone or record not found. Status: {status}"),
        409 => format!("Conflict: Record is being updated by another process. Status: {status}"),
        429 => format!("Rate limit exceeded. Status: {status}"),
        500..=599 => format!("Cloudflare server error (transient): {status} - {body}"),
        _ => format!("Unexpected status: {status} - {body}"),
    }
}

/// Cloudflare DNS provider scoped to one zone
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests
/// - Log the intended PUT payload
/// - **NOT** actually modify DNS records
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Zone holding the records
    zone_id: String,

    /// API base URL, without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// How much of the update response is inspected
    write_verification: WriteVerification,

    /// Dry-run mode: if true, perform GET requests but skip PUT updates
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("api_base", &self.api_base)
            .field("write_verification", &self.write_verification)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a provider for `zone_id` against the public Cloudflare API
    ///
    /// # Errors
    ///
    /// `Error::Config` if the token or zone id is empty, or the HTTP client
    /// cannot be built.
    pub fn new(api_token: impl Into<String>, zone_id: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        let zone_id = zone_id.into();

        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }
        if zone_id.is_empty() {
            return Err(Error::config("Cloudflare zone ID cannot be empty"));
        }

        Ok(Self {
            api_token,
            zone_id,
            api_base: DEFAULT_CLOUDFLARE_API_BASE.to_string(),
            client: build_client(DEFAULT_HTTP_TIMEOUT)?,
            write_verification: WriteVerification::default(),
            dry_run: false,
        })
    }

    /// Create a provider from configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Cloudflare {
                api_token,
                zone_id,
                api_base,
                write_verification,
                dry_run,
                timeout_secs,
            } => {
                if *dry_run {
                    tracing::warn!(
                        "Cloudflare provider running in DRY-RUN mode - no changes will be made"
                    );
                }

                Ok(Self::new(api_token.clone(), zone_id.clone())?
                    .with_api_base(api_base.clone())
                    .with_write_verification(*write_verification)
                    .with_dry_run(*dry_run)
                    .with_timeout(Duration::from_secs(*timeout_secs))?)
            }
        }
    }

    /// Use a different API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Choose how update responses are inspected
    pub fn with_write_verification(mut self, verification: WriteVerification) -> Self {
        self.write_verification = verification;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Use a different per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    fn records_url(&self) -> String {
        format!("{}/zones/{}/dns_records", self.api_base, self.zone_id)
    }

    /// Fetch one page of the zone's records
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?page=N&per_page=100
    /// Authorization: Bearer <token>
    /// ```
    async fn fetch_page(&self, page: u32) -> Result<ListResponse> {
        let url = format!(
            "{}?page={}&per_page={}",
            self.records_url(),
            page,
            RECORDS_PER_PAGE
        );
        tracing::debug!("Listing DNS records, page {}", page);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;

        let parsed: ListResponse = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                Error::protocol(format!("Failed to parse response: {}", e))
            } else {
                Error::protocol(format!(
                    "Failed to parse response ({}): {}",
                    describe_status(status, &body),
                    e
                ))
            }
        })?;

        if !parsed.success {
            return Err(Error::provider(parsed.errors.iter().map(ToString::to_string)));
        }

        Ok(parsed)
    }

    /// Classify the response of an update call
    async fn verify_write(&self, record_name: &str, response: reqwest::Response) -> Result<()> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                Error::write_transport(record_name, format!("Failed to read response: {}", e))
            })?;

        if !status.is_success() {
            let detail = serde_json::from_str::<WriteResponse>(&body)
                .ok()
                .filter(|parsed| !parsed.errors.is_empty())
                .map(|parsed| join_messages(&parsed.errors))
                .unwrap_or_else(|| describe_status(status, &body));
            return Err(Error::write_rejected(record_name, detail));
        }

        match serde_json::from_str::<WriteResponse>(&body) {
            Ok(parsed) if parsed.success => Ok(()),
            Ok(parsed) => Err(Error::write_rejected(
                record_name,
                join_messages(&parsed.errors),
            )),
            Err(e) => Err(Error::write_rejected(
                record_name,
                format!("Unparseable response: {}", e),
            )),
        }
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
}

fn join_messages(messages: &[ApiMessage]) -> String {
    if messages.is_empty() {
        return "success: false".to_string();
    }
    messages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn list_records(&self) -> Result<Vec<DnsRecord>> {
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let response = self.fetch_page(page).await?;
            records.extend(response.result.unwrap_or_default());

            match response.result_info {
                Some(info) if info.total_pages > info.page.max(page) => page += 1,
                _ => break,
            }
        }

        tracing::debug!("Listed {} DNS record(s) over {} page(s)", records.len(), page);
        Ok(records)
    }

    /// Overwrite a record
    ///
    /// # API Call
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {"type": "A", "name": "...", "content": "1.2.3.4", "ttl": 120, "proxied": false}
    /// ```
    async fn update_record(&self, record_id: &str, update: &RecordUpdate) -> Result<()> {
        let url = format!("{}/{}", self.records_url(), record_id);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {:?}",
                url,
                update
            );
            return Ok(());
        }

        tracing::debug!("Updating DNS record {} ({})", update.name, record_id);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .json(update)
            .send()
            .await
            .map_err(|e| Error::write_transport(&update.name, e.to_string()))?;

        match self.write_verification {
            WriteVerification::Lenient => {
                tracing::debug!("Update of {} answered {}", update.name, response.status());
                Ok(())
            }
            WriteVerification::Strict => self.verify_write(&update.name, response).await,
        }
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
