//! Ingestion service, the single entry point for inbound SMS.
//!
//! Each call is independent: validate, classify, persist or query, then
//! reply to the sender. Storage failures send nothing (silence instead of
//! a false confirmation). Reply failures never undo a logged entry.

use std::sync::Arc;

use chrono::Local;
use tracing::{error, info, warn};

use super::classifier::classify;
use super::types::{
    Classification, HealthLogEntry, InboundMessage, Ingested, Outcome, UrgencyRating,
};
use crate::channels::SmsTransport;
use crate::channels::sms::preview;
use crate::error::IngestError;
use crate::store::SpreadsheetStore;

/// Number of entries listed in a summary reply.
pub const SUMMARY_ENTRIES: usize = 3;

/// Reply for a summary request against an empty log.
pub const NO_ENTRIES_REPLY: &str = "No entries found in Health Log.";

/// Reply for a message that is neither a keyword nor a rated entry.
pub const UNRECOGNIZED_REPLY: &str = "Please include an urgency rating (1-10) in your message.";

/// Orchestrates classification, persistence and replies.
pub struct IngestionService {
    store: Arc<dyn SpreadsheetStore>,
    transport: Arc<dyn SmsTransport>,
}

impl IngestionService {
    pub fn new(store: Arc<dyn SpreadsheetStore>, transport: Arc<dyn SmsTransport>) -> Self {
        Self { store, transport }
    }

    /// Handle one inbound message end to end.
    pub async fn ingest(&self, message: &InboundMessage) -> Result<Ingested, IngestError> {
        validate(message)?;

        let sender = message.sender.trim();
        info!(sender = %sender, body = %preview(&message.body), "Received SMS");

        let (outcome, reply) = match classify(&message.body) {
            Classification::DataEntry { urgency, text } => {
                self.log_entry(text, urgency).await?;
                (Outcome::Logged(urgency), format!("Logged for {sender}. ✅"))
            }
            Classification::LinkQuery => (
                Outcome::LinkSent,
                format!("Health Log Link: {}", self.store.shareable_url()),
            ),
            Classification::SummaryQuery => (Outcome::SummarySent, self.summary().await?),
            Classification::Unrecognized => {
                (Outcome::NoUrgencyFound, UNRECOGNIZED_REPLY.to_string())
            }
        };

        if let Err(source) = self.transport.send(sender, &reply).await {
            warn!(
                sender = %sender,
                outcome = outcome.label(),
                error = %source,
                "Reply not delivered"
            );
            return Err(IngestError::Notify { outcome, source });
        }

        info!(sender = %sender, outcome = outcome.label(), "Message handled");
        Ok(Ingested { outcome, reply })
    }

    /// Build and append the entry. The timestamp is captured exactly once.
    async fn log_entry(&self, text: String, urgency: UrgencyRating) -> Result<(), IngestError> {
        let entry = HealthLogEntry::new(Local::now().naive_local(), text, urgency);

        self.store.append(&entry).await.map_err(|e| {
            error!(error = %e, "Failed to append to health log");
            IngestError::Storage(e)
        })?;

        info!(
            date = %entry.date_str(),
            time = %entry.time_str(),
            urgency = urgency.get(),
            "Health log entry appended"
        );
        Ok(())
    }

    /// Render the most recent entries, newest first.
    async fn summary(&self) -> Result<String, IngestError> {
        let entries = self.store.last_n(SUMMARY_ENTRIES).await.map_err(|e| {
            error!(error = %e, "Failed to read recent entries");
            IngestError::Storage(e)
        })?;

        Ok(render_summary(&entries))
    }
}

impl std::fmt::Debug for IngestionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionService").finish_non_exhaustive()
    }
}

/// Sender and body must both be present and non-blank.
fn validate(message: &InboundMessage) -> Result<(), IngestError> {
    if message.sender.trim().is_empty() {
        return Err(IngestError::InvalidPayload("missing sender".into()));
    }
    if message.body.trim().is_empty() {
        return Err(IngestError::InvalidPayload("missing body".into()));
    }
    Ok(())
}

/// Summary text for entries already ordered most recent first.
pub fn render_summary(entries: &[HealthLogEntry]) -> String {
    if entries.is_empty() {
        return NO_ENTRIES_REPLY.to_string();
    }

    let header = match entries.len() {
        1 => "Last entry:".to_string(),
        n => format!("Last {n} entries:"),
    };
    let lines: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| entry.summary_line(i + 1))
        .collect();

    format!("{header}\n{}", lines.join("\n"))
}
