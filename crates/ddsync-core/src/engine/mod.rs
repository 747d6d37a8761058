//! Reconciliation engine
//!
//! The SyncEngine is responsible for:
//! - Fetching the zone's records via DnsProvider
//! - Observing the public address via IpSource
//! - Overwriting every targeted record whose content differs
//! - Waiting for the next tick from the injected Ticker
//!
//! ## Tick Flow
//!
//! ```text
//! ┌──────────────┐   records   ┌──────────────┐   address   ┌──────────────┐
//! │ DnsProvider  │────────────▶│  SyncEngine  │◀────────────│   IpSource   │
//! │ (list)       │             └──────────────┘             └──────────────┘
//! └──────────────┘                    │
//!         ▲                           │ plan_updates()
//!         │        update_record()    │
//!         └───────────────────────────┘
//! ```
//!
//! 1. Fetch records (failure ends the tick, observer is not called)
//! 2. Observe the address (failure ends the tick)
//! 3. Diff targeted records against the address
//! 4. Write each stale record; write failures are logged and skipped
//! 5. Wait for the ticker, repeat
//!
//! Nothing is carried from one tick to the next.

use crate::config::{FailurePolicy, SyncConfig};
use crate::error::Result;
use crate::record::{DnsRecord, UpdatePlan};
use crate::traits::{DnsProvider, IpSource, Ticker};
use std::collections::BTreeSet;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started { targets: Vec<String> },

    /// A targeted record does not hold the observed address
    RecordStale {
        record_name: String,
        current: String,
        observed: String,
    },

    /// Update call completed
    UpdateSucceeded { record_name: String, content: String },

    /// Update call failed
    UpdateFailed { record_name: String, error: String },

    /// Tick finished
    TickCompleted(TickReport),

    /// Tick aborted before any write
    TickFailed { error: String },

    /// Engine stopped
    Stopped { reason: String },
}

/// Outcome of one reconciliation tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Fetched records whose name is a target
    pub matched: usize,
    /// Matched records whose content differed from the observed address
    pub stale: usize,
    /// Update calls that returned without error
    pub updated: usize,
    /// Update calls that returned an error
    pub failed: usize,
}

/// Compute the writes needed to bring targeted records to `observed`
///
/// A record is selected iff its name is exactly (case-sensitively) one of
/// `targets` and its content differs from `observed`. The payload keeps the
/// fetched type, name, TTL and proxied flag. Fetch order is preserved.
pub fn plan_updates(
    records: &[DnsRecord],
    targets: &BTreeSet<String>,
    observed: &str,
) -> Vec<UpdatePlan> {
    records
        .iter()
        .filter(|record| targets.contains(&record.name))
        .filter(|record| record.content != observed)
        .map(|record| UpdatePlan {
            record_id: record.id.clone(),
            previous_content: record.content.clone(),
            update: record.with_content(observed),
        })
        .collect()
}

/// Core reconciliation engine
///
/// ## Lifecycle
///
/// 1. Create with [`SyncEngine::new()`]
/// 2. Drive with [`SyncEngine::run()`] (or single ticks with [`SyncEngine::reconcile_once()`])
/// 3. `run()` returns only on a fatal error or when the ticker is exhausted
///
/// ## Threading
///
/// Every call is awaited in sequence; the engine never spawns tasks.
pub struct SyncEngine {
    /// DNS provider for reading and writing records
    provider: Box<dyn DnsProvider>,

    /// Source of the observed address
    ip_source: Box<dyn IpSource>,

    /// Record names eligible for update
    targets: BTreeSet<String>,

    /// Behavior when fetch or observe fails
    on_error: FailurePolicy,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl SyncEngine {
    /// Create a new engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        provider: Box<dyn DnsProvider>,
        ip_source: Box<dyn IpSource>,
        config: &SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let engine = Self {
            provider,
            ip_source,
            targets: config.target_set(),
            on_error: config.on_error,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run reconciliation ticks until a fatal error or the end of the schedule
    ///
    /// # Returns
    ///
    /// - `Ok(())`: the ticker reported no further ticks
    /// - `Err(Error)`: a tick failed under [`FailurePolicy::Exit`]
    pub async fn run(&self, ticker: &mut dyn Ticker) -> Result<()> {
        let targets: Vec<String> = self.targets.iter().cloned().collect();
        info!("Managing records: {}", targets.join(", "));
        self.emit_event(EngineEvent::Started { targets });

        loop {
            if let Err(e) = self.reconcile_once().await {
                self.emit_event(EngineEvent::TickFailed {
                    error: e.to_string(),
                });

                match self.on_error {
                    FailurePolicy::Exit => {
                        error!("Reconciliation failed: {}", e);
                        self.emit_event(EngineEvent::Stopped {
                            reason: e.to_string(),
                        });
                        return Err(e);
                    }
                    FailurePolicy::Continue => {
                        warn!("Reconciliation failed, retrying next tick: {}", e);
                    }
                }
            }

            if !ticker.tick().await {
                info!("Schedule exhausted, engine stopped");
                self.emit_event(EngineEvent::Stopped {
                    reason: "Schedule exhausted".to_string(),
                });
                return Ok(());
            }
        }
    }

    /// Perform a single fetch-observe-compare-update pass
    ///
    /// # Errors
    ///
    /// Fetch and observe failures are returned. Write failures are logged,
    /// counted in the report and never returned.
    pub async fn reconcile_once(&self) -> Result<TickReport> {
        let records = self.provider.list_records().await?;
        debug!(
            "Fetched {} record(s) from {}",
            records.len(),
            self.provider.provider_name()
        );

        let observed = self.ip_source.current().await?;
        debug!("Observed address: {}", observed);

        let matched = records
            .iter()
            .filter(|record| self.targets.contains(&record.name))
            .count();
        let plans = plan_updates(&records, &self.targets, &observed);

        let mut report = TickReport {
            matched,
            stale: plans.len(),
            ..TickReport::default()
        };

        for plan in &plans {
            let name = &plan.update.name;
            info!(
                "Record {} is stale ({} -> {})",
                name, plan.previous_content, observed
            );
            self.emit_event(EngineEvent::RecordStale {
                record_name: name.clone(),
                current: plan.previous_content.clone(),
                observed: observed.clone(),
            });

            match self.provider.update_record(&plan.record_id, &plan.update).await {
                Ok(()) => {
                    info!("Updated {} -> {}", name, observed);
                    report.updated += 1;
                    self.emit_event(EngineEvent::UpdateSucceeded {
                        record_name: name.clone(),
                        content: observed.clone(),
                    });
                }
                Err(e) => {
                    warn!("Failed to update record {}: {}", name, e);
                    report.failed += 1;
                    self.emit_event(EngineEvent::UpdateFailed {
                        record_name: name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        for target in &self.targets {
            if !records.iter().any(|record| &record.name == target) {
                warn!("Target {} not found in zone", target);
            }
        }

        self.emit_event(EngineEvent::TickCompleted(report));
        Ok(report)
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // Never block the loop on a slow consumer; no receiver means nobody is listening
        match self.event_tx.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(_)) => debug!("Event channel full, dropping event"),
        }
    }
}
