// # Ticker Trait
//
// Decides when the next reconciliation tick happens.
//
// The engine calls `tick()` after every reconciliation. Production code uses
// `IntervalTicker`, which sleeps for the configured interval and never ends.
// Tests inject their own tickers to drive the loop without waiting.

use async_trait::async_trait;
use std::time::Duration;

/// Source of reconciliation ticks
#[async_trait]
pub trait Ticker: Send {
    /// Wait until the next tick is due
    ///
    /// Returns `false` when the schedule is exhausted and the engine should
    /// return instead of reconciling again.
    async fn tick(&mut self) -> bool;
}

/// Fixed-interval ticker backed by `tokio::time::sleep`
///
/// The sleep is not cancellable; stopping early requires terminating the
/// process.
#[derive(Debug, Clone)]
pub struct IntervalTicker {
    period: Duration,
}

impl IntervalTicker {
    /// Create a ticker that waits `period` between ticks
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// The configured wait between ticks
    pub fn period(&self) -> Duration {
        self.period
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        tokio::time::sleep(self.period).await;
        true
    }
}

/// Ticker with an empty schedule: the engine reconciles exactly once
#[derive(Debug, Clone, Copy, Default)]
pub struct OnceTicker;

#[async_trait]
impl Ticker for OnceTicker {
    async fn tick(&mut self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_interval_ticker_waits_full_period() {
        let mut ticker = IntervalTicker::new(Duration::from_secs(300));
        let started = tokio::time::Instant::now();

        assert!(ticker.tick().await);
        assert!(started.elapsed() >= Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_once_ticker_ends_immediately() {
        let mut ticker = OnceTicker;
        assert!(!ticker.tick().await);
    }
}
