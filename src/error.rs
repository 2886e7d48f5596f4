//! Error types for the health SMS bot.

use crate::ingest::types::Outcome;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Health log storage errors (append or read against the log).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Outbound SMS errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to send SMS: {reason}")]
    SendFailed { reason: String },

    #[error("SMS endpoint rejected the request with status {status}")]
    Rejected { status: u16 },
}

/// Failures of a single inbound-message ingest.
///
/// Unrecognized messages are not errors; they surface as
/// [`Outcome::NoUrgencyFound`].
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),

    /// The reply could not be delivered. Anything the outcome committed
    /// (a logged entry) stays committed.
    #[error("Reply for '{}' not delivered: {source}", .outcome.label())]
    Notify {
        outcome: Outcome,
        #[source]
        source: TransportError,
    },
}

/// Scheduled check-in trigger failures.
#[derive(Debug, thiserror::Error)]
pub enum CheckInError {
    #[error("Unauthorized trigger")]
    Unauthorized,

    #[error("Check-in prompt not delivered: {0}")]
    Delivery(#[from] TransportError),
}
