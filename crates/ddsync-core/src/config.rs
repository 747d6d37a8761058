//! Configuration types for ddsync
//!
//! A [`SyncConfig`] is built once at startup, validated, and moved into the
//! engine. Nothing in it changes for the lifetime of the process.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

/// Cloudflare API base URL
pub const DEFAULT_CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default address-echo endpoint
pub const DEFAULT_IP_URL: &str = "https://ifconfig.me/ip";

/// Main ddsync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Record names eligible for update (exact, case-sensitive)
    pub targets: Vec<String>,

    /// Seconds to wait between reconciliation ticks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// What to do when fetching records or observing the address fails
    #[serde(default)]
    pub on_error: FailurePolicy,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// IP source configuration
    #[serde(default)]
    pub ip_source: IpSourceConfig,

    /// Capacity of the engine event channel
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl SyncConfig {
    /// Create a configuration with defaults for everything but the essentials
    pub fn new(targets: Vec<String>, provider: ProviderConfig) -> Self {
        Self {
            targets,
            interval_secs: default_interval_secs(),
            on_error: FailurePolicy::default(),
            provider,
            ip_source: IpSourceConfig::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// The wait between ticks
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Targets with duplicates removed
    pub fn target_set(&self) -> BTreeSet<String> {
        self.targets.iter().cloned().collect()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.targets.is_empty() {
            return Err(crate::Error::config("No target records configured"));
        }

        for target in &self.targets {
            validate_hostname(target)?;
        }

        if self.interval_secs == 0 {
            return Err(crate::Error::config("Refresh interval must be > 0"));
        }

        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        self.provider.validate()?;
        self.ip_source.validate()?;

        Ok(())
    }
}

/// Behavior when a tick fails before any write is attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the engine and surface the error
    #[default]
    Exit,
    /// Log the error and wait for the next tick
    Continue,
}

/// How much of the update response is inspected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteVerification {
    /// Only a failed request counts as a write error; the response is ignored
    #[default]
    Lenient,
    /// A non-success status or `success: false` body is a rejected write
    Strict,
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Cloudflare API token
        api_token: String,
        /// Zone holding the target records
        zone_id: String,
        /// API base URL
        #[serde(default = "default_api_base")]
        api_base: String,
        /// Response inspection on writes
        #[serde(default)]
        write_verification: WriteVerification,
        /// Log intended writes instead of sending them
        #[serde(default)]
        dry_run: bool,
        /// Per-request timeout in seconds
        #[serde(default = "default_http_timeout_secs")]
        timeout_secs: u64,
    },
}

impl ProviderConfig {
    /// Cloudflare configuration with default base URL, verification and timeout
    pub fn cloudflare(api_token: impl Into<String>, zone_id: impl Into<String>) -> Self {
        ProviderConfig::Cloudflare {
            api_token: api_token.into(),
            zone_id: zone_id.into(),
            api_base: default_api_base(),
            write_verification: WriteVerification::default(),
            dry_run: false,
            timeout_secs: default_http_timeout_secs(),
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare {
                api_token,
                zone_id,
                api_base,
                timeout_secs,
                ..
            } => {
                if api_token.is_empty() {
                    return Err(crate::Error::config("Cloudflare API token cannot be empty"));
                }
                if zone_id.is_empty() {
                    return Err(crate::Error::config("Cloudflare zone ID cannot be empty"));
                }
                validate_http_url("Cloudflare API base", api_base)?;
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("HTTP timeout must be > 0"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
        }
    }
}

// The token never appears in Debug output.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::Cloudflare {
                zone_id,
                api_base,
                write_verification,
                dry_run,
                timeout_secs,
                ..
            } => f
                .debug_struct("Cloudflare")
                .field("api_token", &"<REDACTED>")
                .field("zone_id", zone_id)
                .field("api_base", api_base)
                .field("write_verification", write_verification)
                .field("dry_run", dry_run)
                .field("timeout_secs", timeout_secs)
                .finish(),
        }
    }
}

/// IP source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpSourceConfig {
    /// HTTP echo service returning the address as plain text
    Http {
        /// URL to fetch the address from
        url: String,
        /// Per-request timeout in seconds
        #[serde(default = "default_http_timeout_secs")]
        timeout_secs: u64,
    },
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            IpSourceConfig::Http { url, timeout_secs } => {
                validate_http_url("IP source URL", url)?;
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("HTTP timeout must be > 0"));
                }
                Ok(())
            }
        }
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        IpSourceConfig::Http {
            url: DEFAULT_IP_URL.to_string(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

fn validate_http_url(what: &str, url: &str) -> Result<(), crate::Error> {
    if url.is_empty() {
        return Err(crate::Error::config(format!("{what} cannot be empty")));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{what} must use HTTP or HTTPS scheme. Got: {url}"
        )));
    }
    Ok(())
}

/// Validate that a string is a plausible DNS record name
///
/// Basic RFC 1035 checks plus the forms providers accept in record names:
/// a leading `*` wildcard label and underscores (`_acme-challenge`).
pub fn validate_hostname(name: &str) -> Result<(), crate::Error> {
    if name.is_empty() {
        return Err(crate::Error::config("Record name cannot be empty"));
    }

    if name.len() > 253 {
        return Err(crate::Error::config(format!(
            "Record name too long: {} chars (max 253). Got: {}",
            name.len(),
            name
        )));
    }

    for (index, label) in name.split('.').enumerate() {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Record name has empty label: '{name}'"
            )));
        }

        if label == "*" && index == 0 {
            continue;
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Record label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(crate::Error::config(format!(
                "Record label contains invalid characters. Label: '{label}'"
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Record label cannot start or end with hyphen. Label: '{label}'"
            )));
        }
    }

    Ok(())
}

fn default_interval_secs() -> u64 {
    300
}

fn default_api_base() -> String {
    DEFAULT_CLOUDFLARE_API_BASE.to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_event_channel_capacity() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(targets: &[&str]) -> SyncConfig {
        SyncConfig::new(
            targets.iter().map(|t| t.to_string()).collect(),
            ProviderConfig::cloudflare("token", "zone"),
        )
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&["host.example.com"]);
        assert_eq!(cfg.interval(), Duration::from_secs(300));
        assert_eq!(cfg.on_error, FailurePolicy::Exit);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_requires_targets() {
        assert!(matches!(
            config(&[]).validate(),
            Err(crate::Error::Config(_))
        ));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let mut cfg = config(&["host.example.com"]);
        cfg.interval_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_credentials() {
        let cfg = SyncConfig::new(
            vec!["host.example.com".to_string()],
            ProviderConfig::cloudflare("", "zone"),
        );
        assert!(cfg.validate().is_err());

        let cfg = SyncConfig::new(
            vec!["host.example.com".to_string()],
            ProviderConfig::cloudflare("token", ""),
        );
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_non_http_ip_url() {
        let mut cfg = config(&["host.example.com"]);
        cfg.ip_source = IpSourceConfig::Http {
            url: "ftp://ifconfig.me".to_string(),
            timeout_secs: 10,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_target_set_collapses_duplicates() {
        let cfg = config(&["a.example.com", "b.example.com", "a.example.com"]);
        assert_eq!(cfg.target_set().len(), 2);
    }

    #[test]
    fn test_hostname_validation() {
        assert!(validate_hostname("example.com").is_ok());
        assert!(validate_hostname("Home.example.com").is_ok());
        assert!(validate_hostname("*.example.com").is_ok());
        assert!(validate_hostname("_acme-challenge.example.com").is_ok());

        assert!(validate_hostname("").is_err());
        assert!(validate_hostname("a..example.com").is_err());
        assert!(validate_hostname("-bad.example.com").is_err());
        assert!(validate_hostname("sp ace.example.com").is_err());
        assert!(validate_hostname("a.*.example.com").is_err());
        assert!(validate_hostname(&format!("{}.com", "a".repeat(64))).is_err());
    }

    #[test]
    fn test_provider_debug_redacts_token() {
        let provider = ProviderConfig::cloudflare("secret_token_12345", "zone");
        let debug_str = format!("{provider:?}");
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("zone"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let cfg: SyncConfig = serde_json::from_value(json!({
            "targets": ["host.example.com"],
            "provider": {
                "type": "cloudflare",
                "api_token": "token",
                "zone_id": "zone"
            }
        }))
        .unwrap();

        assert_eq!(cfg.interval_secs, 300);
        assert_eq!(cfg.provider.type_name(), "cloudflare");
        assert!(matches!(
            cfg.ip_source,
            IpSourceConfig::Http { ref url, .. } if url == DEFAULT_IP_URL
        ));
        assert!(cfg.validate().is_ok());
    }
}
