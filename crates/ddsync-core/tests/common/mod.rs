//! Test doubles and common utilities for engine contract tests

#![allow(dead_code)]

use ddsync_core::config::{ProviderConfig, SyncConfig};
use ddsync_core::error::{Error, Result};
use ddsync_core::record::{DnsRecord, RecordUpdate};
use ddsync_core::traits::{DnsProvider, IpSource, Ticker};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Build an `A` record
pub fn a_record(id: &str, name: &str, content: &str, ttl: u32, proxied: bool) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        record_type: "A".to_string(),
        name: name.to_string(),
        content: content.to_string(),
        ttl,
        proxied,
    }
}

/// A mock DnsProvider serving an in-memory zone and recording every update
///
/// Clones share the zone and the counters.
#[derive(Clone)]
pub struct MockDnsProvider {
    /// Records returned by list_records()
    zone: Arc<Mutex<Vec<DnsRecord>>>,
    /// When set, list_records() fails with this error
    list_error: Arc<Mutex<Option<Error>>>,
    /// Record ids whose updates fail
    failing_ids: Arc<Mutex<HashSet<String>>>,
    /// Whether successful updates are applied to the zone
    durable: bool,
    /// Call counter for list_records()
    list_call_count: Arc<AtomicUsize>,
    /// Recorded (record_id, payload) pairs, failures included
    updates: Arc<Mutex<Vec<(String, RecordUpdate)>>>,
}

impl MockDnsProvider {
    /// A provider that applies successful updates to its zone
    pub fn durable(records: Vec<DnsRecord>) -> Self {
        Self::build(records, true)
    }

    /// A provider that accepts updates but never changes its zone
    pub fn forgetful(records: Vec<DnsRecord>) -> Self {
        Self::build(records, false)
    }

    fn build(records: Vec<DnsRecord>, durable: bool) -> Self {
        Self {
            zone: Arc::new(Mutex::new(records)),
            list_error: Arc::new(Mutex::new(None)),
            failing_ids: Arc::new(Mutex::new(HashSet::new())),
            durable,
            list_call_count: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make list_records() fail (or succeed again with `None`)
    pub fn set_list_error(&self, error: Option<Error>) {
        *self.list_error.lock().unwrap() = error;
    }

    /// Make updates to `record_id` fail
    pub fn fail_updates_for(&self, record_id: &str) {
        self.failing_ids
            .lock()
            .unwrap()
            .insert(record_id.to_string());
    }

    /// Get the number of times list_records() was called
    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    /// Get every update attempted so far
    pub fn updates(&self) -> Vec<(String, RecordUpdate)> {
        self.updates.lock().unwrap().clone()
    }

    /// Get the number of update attempts
    pub fn update_call_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    /// Current content of the zone
    pub fn zone(&self) -> Vec<DnsRecord> {
        self.zone.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(&self) -> Result<Vec<DnsRecord>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.list_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.zone.lock().unwrap().clone())
    }

    async fn update_record(&self, record_id: &str, update: &RecordUpdate) -> Result<()> {
        self.updates
            .lock()
            .unwrap()
            .push((record_id.to_string(), update.clone()));

        if self.failing_ids.lock().unwrap().contains(record_id) {
            return Err(Error::write_transport(&update.name, "connection reset"));
        }

        if self.durable {
            let mut zone = self.zone.lock().unwrap();
            if let Some(record) = zone.iter_mut().find(|r| r.id == record_id) {
                record.content = update.content.clone();
            }
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// An IpSource returning a settable address and counting lookups
///
/// Clones share the address and the counter.
#[derive(Clone)]
pub struct MockIpSource {
    address: Arc<Mutex<Result<String>>>,
    call_count: Arc<AtomicUsize>,
}

impl MockIpSource {
    pub fn new(address: &str) -> Self {
        Self {
            address: Arc::new(Mutex::new(Ok(address.to_string()))),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// An IpSource whose every lookup fails
    pub fn failing(error: Error) -> Self {
        Self {
            address: Arc::new(Mutex::new(Err(error))),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Change what the next lookups return
    pub fn set_address(&self, address: &str) {
        *self.address.lock().unwrap() = Ok(address.to_string());
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for MockIpSource {
    async fn current(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.address.lock().unwrap().clone()
    }
}

/// A ticker that allows a fixed number of further ticks without waiting
pub struct CountdownTicker {
    remaining: usize,
    ticks: usize,
}

impl CountdownTicker {
    /// `extra_ticks` ticks follow the first reconciliation
    pub fn new(extra_ticks: usize) -> Self {
        Self {
            remaining: extra_ticks,
            ticks: 0,
        }
    }

    /// How many times tick() was awaited
    pub fn ticks(&self) -> usize {
        self.ticks
    }
}

#[async_trait::async_trait]
impl Ticker for CountdownTicker {
    async fn tick(&mut self) -> bool {
        self.ticks += 1;
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Helper to create a minimal SyncConfig for testing
pub fn minimal_config(targets: &[&str]) -> SyncConfig {
    let mut config = SyncConfig::new(
        targets.iter().map(|t| t.to_string()).collect(),
        ProviderConfig::cloudflare("test-token", "test-zone"),
    );
    config.event_channel_capacity = 100;
    config
}
