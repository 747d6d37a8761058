// # ddsyncd - DNS record synchronization daemon
//
// A thin integration layer: all reconciliation logic lives in ddsync-core.
//
// The ddsyncd daemon is responsible for:
// 1. Reading configuration from flags or environment variables
// 2. Initializing logging and the runtime
// 3. Building the Cloudflare provider and the HTTP IP source
// 4. Running the sync engine until it fails or the process is killed
//
// ## Example
//
// ```bash
// export DDSYNC_API_KEY=your_token
// ddsyncd --zone-id 023e105f4ecef8ad9ca31a8372d0c353 \
//     --record home.example.com --record vpn.example.com \
//     --refresh-seconds 300
// ```

mod cli;

use anyhow::Result;
use clap::Parser;
use ddsync_cloudflare::CloudflareProvider;
use ddsync_core::traits::{IntervalTicker, OnceTicker, Ticker};
use ddsync_core::{SyncConfig, SyncEngine};
use ddsync_ip_http::HttpIpSource;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use cli::Cli;

/// Exit codes for different termination scenarios
///
/// - 0: Clean exit (only reachable with `--once`)
/// - 1: Configuration or startup error
/// - 2: Records or public IP could not be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdsyncExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (fatal reconciliation failure)
    RuntimeError = 2,
}

impl From<DdsyncExitCode> for ExitCode {
    fn from(code: DdsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            return DdsyncExitCode::ConfigError.into();
        }
    };

    let config = cli.to_config();
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DdsyncExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::from(cli.log_level))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdsyncExitCode::ConfigError.into();
    }

    info!("Starting ddsyncd");
    if cli.dry_run {
        info!("Running in dry-run mode, no changes to the DNS provider will be made");
    }

    let engine = match build_engine(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Startup error: {}", e);
            return DdsyncExitCode::ConfigError.into();
        }
    };

    // One thread of control: every call is awaited in sequence
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdsyncExitCode::RuntimeError.into();
        }
    };

    let mut ticker: Box<dyn Ticker> = if cli.once {
        Box::new(OnceTicker)
    } else {
        Box::new(IntervalTicker::new(config.interval()))
    };

    let outcome = rt.block_on(engine.run(ticker.as_mut()));
    if let Err(e) = &outcome {
        error!("Exiting: {}", e);
    }

    exit_code_for(&outcome).into()
}

/// Map the end of the engine loop to a process exit code
fn exit_code_for(outcome: &ddsync_core::Result<()>) -> DdsyncExitCode {
    match outcome {
        Ok(()) => DdsyncExitCode::CleanShutdown,
        Err(_) => DdsyncExitCode::RuntimeError,
    }
}

/// Build the engine from validated configuration
fn build_engine(config: &SyncConfig) -> Result<SyncEngine> {
    let provider = CloudflareProvider::from_config(&config.provider)?;
    let ip_source = HttpIpSource::from_config(&config.ip_source)?;

    info!("Provider type: {}", config.provider.type_name());
    info!(
        "Refresh interval: {}s, on error: {:?}",
        config.interval_secs, config.on_error
    );

    let (engine, _events) = SyncEngine::new(Box::new(provider), Box::new(ip_source), config)?;
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddsync_core::Error;

    #[test]
    fn test_exhausted_schedule_exits_cleanly() {
        assert_eq!(exit_code_for(&Ok(())), DdsyncExitCode::CleanShutdown);
        assert_eq!(DdsyncExitCode::CleanShutdown as u8, 0);
    }

    #[test]
    fn test_fatal_tick_failure_exits_with_runtime_error() {
        let fetch = Err(Error::transport("connection refused"));
        let observe = Err(Error::protocol("not an address"));

        assert_eq!(exit_code_for(&fetch), DdsyncExitCode::RuntimeError);
        assert_eq!(exit_code_for(&observe), DdsyncExitCode::RuntimeError);
        assert_eq!(DdsyncExitCode::RuntimeError as u8, 2);
    }

    #[test]
    fn test_config_error_code() {
        assert_eq!(DdsyncExitCode::ConfigError as u8, 1);
    }
}
