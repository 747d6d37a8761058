// # ddsync-core
//
// Core library for the ddsync DNS record synchronization agent.
//
// ## Architecture Overview
//
// This library provides the reconciliation loop and its seams:
// - **DnsProvider**: Trait for listing and overwriting DNS records
// - **IpSource**: Trait for observing the current public address
// - **Ticker**: Trait for scheduling reconciliation ticks
// - **SyncEngine**: Fetch, observe, diff, update, repeat
//
// ## Design Principles
//
// 1. **Stateless ticks**: Every tick rebuilds its view from the provider
// 2. **Sequential**: One call at a time, no spawned tasks
// 3. **Idempotent**: Records that already hold the address are never written
// 4. **Library-First**: The daemon is a thin wrapper around this crate

pub mod config;
pub mod engine;
pub mod error;
pub mod record;
pub mod traits;

// Re-export core types for convenience
pub use config::{FailurePolicy, IpSourceConfig, ProviderConfig, SyncConfig, WriteVerification};
pub use engine::{EngineEvent, SyncEngine, TickReport, plan_updates};
pub use error::{Error, Result, WriteFailure};
pub use record::{DnsRecord, RecordUpdate, UpdatePlan};
pub use traits::{DnsProvider, IntervalTicker, IpSource, OnceTicker, Ticker};
