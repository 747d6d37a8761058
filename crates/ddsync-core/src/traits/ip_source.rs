// # IP Source Trait
//
// Defines the interface for observing the caller's current public address.
//
// ## Implementations
//
// - HTTP echo service: `ddsync-ip-http` crate

use async_trait::async_trait;

/// Trait for IP source implementations
///
/// Every call performs a live lookup. Implementations must not cache the
/// result or retry on failure; the next tick is the retry.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IP address as a trimmed string
    ///
    /// # Errors
    ///
    /// - `Error::Transport`: the lookup could not be completed
    /// - `Error::Protocol`: the service answered with something that is not an address
    async fn current(&self) -> Result<String, crate::Error>;
}
