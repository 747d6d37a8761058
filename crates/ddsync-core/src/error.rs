//! Error types for ddsync
//!
//! This module defines all error types used throughout the workspace.

use std::fmt;
use thiserror::Error;

/// Result type alias for ddsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ddsync
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The request could not be completed, or its body could not be read
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected structure
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A well-formed response that reports an application-level failure
    #[error("Provider error: {}", .errors.join("; "))]
    Provider {
        /// Error entries reported by the provider, rendered as text
        errors: Vec<String>,
    },

    /// An update call failed or was rejected
    #[error("Write error ({record}): {reason}")]
    Write {
        /// Name of the record being written
        record: String,
        /// Why the write failed
        reason: WriteFailure,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Classification of a failed record update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteFailure {
    /// The PUT request never produced a response
    Transport(String),
    /// The provider answered but did not accept the update
    Rejected(String),
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteFailure::Transport(msg) => write!(f, "transport failure: {msg}"),
            WriteFailure::Rejected(msg) => write!(f, "rejected: {msg}"),
        }
    }
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a provider error from the provider's error list
    pub fn provider<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Provider {
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a write error caused by a transport failure
    pub fn write_transport(record: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Write {
            record: record.into(),
            reason: WriteFailure::Transport(msg.into()),
        }
    }

    /// Create a write error caused by the provider refusing the update
    pub fn write_rejected(record: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Write {
            record: record.into(),
            reason: WriteFailure::Rejected(msg.into()),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error aborts the tick it occurred in.
    ///
    /// Write errors are contained within the tick; everything else on the
    /// fetch or observe path ends it.
    pub fn is_fatal_for_tick(&self) -> bool {
        !matches!(self, Error::Write { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_lists_all_entries() {
        let err = Error::provider(["invalid zone", "bad token"]);
        assert_eq!(err.to_string(), "Provider error: invalid zone; bad token");
    }

    #[test]
    fn test_write_errors_distinguish_reason() {
        let transport = Error::write_transport("host.example.com", "connection reset");
        let rejected = Error::write_rejected("host.example.com", "status 400");

        assert_eq!(
            transport.to_string(),
            "Write error (host.example.com): transport failure: connection reset"
        );
        assert_eq!(
            rejected.to_string(),
            "Write error (host.example.com): rejected: status 400"
        );
    }

    #[test]
    fn test_only_write_errors_are_contained() {
        assert!(Error::transport("down").is_fatal_for_tick());
        assert!(Error::protocol("garbage").is_fatal_for_tick());
        assert!(Error::provider(["invalid zone"]).is_fatal_for_tick());
        assert!(!Error::write_rejected("a.example.com", "no").is_fatal_for_tick());
    }
}
