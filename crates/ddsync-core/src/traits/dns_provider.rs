// # DNS Provider Trait
//
// Defines the interface for reading and overwriting DNS records via a
// provider API.
//
// ## Implementations
//
// - Cloudflare: `ddsync-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddsync_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     for record in provider.list_records().await? {
//         if record.name == "home.example.com" {
//             provider.update_record(&record.id, &record.with_content("203.0.113.7")).await?;
//         }
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::record::{DnsRecord, RecordUpdate};

/// Trait for DNS provider implementations
///
/// A provider is scoped to one zone and one credential, both fixed at
/// construction.
///
/// # Allowed
/// - HTTP/HTTPS calls to the provider's own endpoints
/// - Parsing provider-specific responses
///
/// # Forbidden
/// - Retrying, sleeping or spawning tasks (the engine owns scheduling)
/// - Caching records between calls
/// - Deciding whether an update is needed (owned by `SyncEngine`)
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every record in the zone, in the order the provider reports them
    ///
    /// # Errors
    ///
    /// - `Error::Transport`: the request could not be completed
    /// - `Error::Protocol`: the body is not the expected structure
    /// - `Error::Provider`: the provider reported failure
    async fn list_records(&self) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Overwrite a record
    ///
    /// # Parameters
    ///
    /// - `record_id`: provider identifier of the record
    /// - `update`: full record body; the provider replaces the record with it
    ///
    /// # Errors
    ///
    /// - `Error::Write`: the update could not be delivered or was rejected
    async fn update_record(
        &self,
        record_id: &str,
        update: &RecordUpdate,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
