//! Core traits for ddsync
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsProvider`]: Read and overwrite records via a provider API
//! - [`IpSource`]: Observe the current public address
//! - [`Ticker`]: Schedule reconciliation ticks

pub mod dns_provider;
pub mod ip_source;
pub mod ticker;

pub use dns_provider::DnsProvider;
pub use ip_source::IpSource;
pub use ticker::{IntervalTicker, OnceTicker, Ticker};
