//! Command-line and environment configuration for ddsyncd

use clap::{ArgAction, Parser, ValueEnum};
use ddsync_core::config::{
    DEFAULT_CLOUDFLARE_API_BASE, DEFAULT_IP_URL, FailurePolicy, IpSourceConfig, ProviderConfig,
    SyncConfig, WriteVerification,
};
use tracing::Level;

macro_rules! env_prefix {
    () => {
        "DDSYNC_"
    };
}

/// Keep Cloudflare DNS records pointed at this host's public IP address
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Record name to keep updated; repeat for several records
    #[arg(
        long = "record",
        visible_alias = "records",
        value_name = "NAME",
        required = true,
        action = ArgAction::Append,
        value_delimiter = ',',
        env = concat!(env_prefix!(), "RECORDS")
    )]
    pub records: Vec<String>,

    /// Cloudflare API token with DNS edit permission on the zone
    #[arg(
        long,
        alias = "apiKey",
        value_name = "TOKEN",
        hide_env_values = true,
        env = concat!(env_prefix!(), "API_KEY")
    )]
    pub api_key: String,

    /// Cloudflare zone ID holding the records
    #[arg(
        long,
        alias = "zoneID",
        value_name = "ZONE_ID",
        env = concat!(env_prefix!(), "ZONE_ID")
    )]
    pub zone_id: String,

    /// Seconds to sleep between reconciliation runs
    #[arg(
        long,
        alias = "refreshSeconds",
        value_name = "SECONDS",
        default_value_t = 300,
        env = concat!(env_prefix!(), "REFRESH_SECONDS")
    )]
    pub refresh_seconds: u64,

    /// Endpoint returning the public IP address as plain text
    #[arg(
        long,
        value_name = "URL",
        default_value = DEFAULT_IP_URL,
        env = concat!(env_prefix!(), "IP_URL")
    )]
    pub ip_url: String,

    /// Cloudflare API base URL
    #[arg(
        long,
        value_name = "URL",
        default_value = DEFAULT_CLOUDFLARE_API_BASE,
        env = concat!(env_prefix!(), "API_BASE")
    )]
    pub api_base: String,

    /// Timeout for every HTTP request, in seconds
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 30,
        env = concat!(env_prefix!(), "HTTP_TIMEOUT_SECS")
    )]
    pub http_timeout_secs: u64,

    /// What to do when records or the public IP cannot be fetched
    #[arg(
        value_enum,
        long,
        default_value_t = OnError::Exit,
        env = concat!(env_prefix!(), "ON_ERROR")
    )]
    pub on_error: OnError,

    /// Treat update responses reporting failure as errors
    #[arg(long, action, default_value_t = false, env = concat!(env_prefix!(), "STRICT_WRITES"))]
    pub strict_writes: bool,

    /// Do not make any changes to the DNS records, only log what would happen
    #[arg(
        long,
        short = 'd',
        action,
        default_value_t = false,
        env = concat!(env_prefix!(), "DRY_RUN")
    )]
    pub dry_run: bool,

    /// Reconcile once, then exit
    #[arg(long, action, default_value_t = false, env = concat!(env_prefix!(), "ONCE"))]
    pub once: bool,

    /// Set the loglevel of the application
    #[arg(
        value_enum,
        short = 'l',
        long,
        default_value_t = Loglevel::Info,
        value_name = "LEVEL",
        env = concat!(env_prefix!(), "LOG_LEVEL")
    )]
    pub log_level: Loglevel,
}

impl Cli {
    /// Build the immutable engine configuration
    pub fn to_config(&self) -> SyncConfig {
        let provider = ProviderConfig::Cloudflare {
            api_token: self.api_key.clone(),
            zone_id: self.zone_id.clone(),
            api_base: self.api_base.clone(),
            write_verification: if self.strict_writes {
                WriteVerification::Strict
            } else {
                WriteVerification::Lenient
            },
            dry_run: self.dry_run,
            timeout_secs: self.http_timeout_secs,
        };

        let mut config = SyncConfig::new(self.records.clone(), provider);
        config.interval_secs = self.refresh_seconds;
        config.on_error = self.on_error.into();
        config.ip_source = IpSourceConfig::Http {
            url: self.ip_url.clone(),
            timeout_secs: self.http_timeout_secs,
        };
        config
    }
}

/// Reaction to a failed record fetch or address lookup
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum OnError {
    /// Log the error and exit non-zero
    Exit,
    /// Log the error and try again on the next tick
    Continue,
}

impl From<OnError> for FailurePolicy {
    fn from(value: OnError) -> Self {
        match value {
            OnError::Exit => FailurePolicy::Exit,
            OnError::Continue => FailurePolicy::Continue,
        }
    }
}

/// Used to set the applications loglevel
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum Loglevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<Loglevel> for Level {
    fn from(ll: Loglevel) -> Self {
        match ll {
            Loglevel::Error => Level::ERROR,
            Loglevel::Warn => Level::WARN,
            Loglevel::Info => Level::INFO,
            Loglevel::Debug => Level::DEBUG,
            Loglevel::Trace => Level::TRACE,
        }
    }
}
