//! DNS record data model
//!
//! Records are decoded verbatim from the provider on every tick and never
//! cached. An update rewrites only `content`; every other field is re-sent
//! exactly as it was fetched.

use serde::{Deserialize, Deserializer, Serialize};

/// A DNS record as reported by the provider
///
/// Missing or `null` fields decode as their zero value, so one odd record
/// elsewhere in the zone cannot fail the whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned identifier (opaque)
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    /// Record type, e.g. `A` or `AAAA`
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub record_type: String,

    /// Hostname
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Current value, typically an IP address
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,

    /// Time-to-live in seconds
    #[serde(default, deserialize_with = "null_as_default")]
    pub ttl: u32,

    /// Reverse-proxy flag; providers omit it for types that cannot be proxied
    #[serde(default, deserialize_with = "null_as_default")]
    pub proxied: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl DnsRecord {
    /// Build the write payload that replaces this record's content
    pub fn with_content(&self, content: impl Into<String>) -> RecordUpdate {
        RecordUpdate {
            record_type: self.record_type.clone(),
            name: self.name.clone(),
            content: content.into(),
            ttl: self.ttl,
            proxied: self.proxied,
        }
    }
}

/// Body of an update call: `{type, name, content, ttl, proxied}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUpdate {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
}

/// A pending write: which record to overwrite and with what
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    /// Identifier of the record being overwritten
    pub record_id: String,
    /// Content the record had when fetched
    pub previous_content: String,
    /// Payload to send
    pub update: RecordUpdate,
}
