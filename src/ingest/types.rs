//! Shared types for the ingestion pipeline.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Deserialize;

/// Date column format of the health log.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Time column format of the health log.
pub const TIME_FORMAT: &str = "%H:%M:%S";

// ── Inbound message ─────────────────────────────────────────────────

/// A single SMS delivered by the transport.
///
/// Missing JSON fields deserialize as empty strings so that validation
/// happens in one place (`IngestionService::ingest`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundMessage {
    /// Opaque sender identifier (phone number).
    #[serde(default)]
    pub sender: String,
    /// Raw message text.
    #[serde(default)]
    pub body: String,
}

impl InboundMessage {
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
        }
    }
}

// ── Urgency rating ──────────────────────────────────────────────────

/// A symptom severity rating, always within `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UrgencyRating(u8);

impl UrgencyRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Returns `None` for values outside `1..=10`. Out-of-range values are
    /// never clamped.
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&value)
            .then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for UrgencyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Log entry ───────────────────────────────────────────────────────

/// One row of the health log: Date, Time, Body, Urgency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthLogEntry {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub body: String,
    pub urgency: UrgencyRating,
}

impl HealthLogEntry {
    /// Build an entry from a single captured timestamp. Sub-second precision
    /// is dropped to match the stored time column.
    pub fn new(at: NaiveDateTime, body: impl Into<String>, urgency: UrgencyRating) -> Self {
        let time = at.time();
        Self {
            date: at.date(),
            time: time.with_nanosecond(0).unwrap_or(time),
            body: body.into(),
            urgency,
        }
    }

    pub fn date_str(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn time_str(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }

    /// Render as a numbered summary line: `"2. 2024-03-01 08:15:00 - Urgency: 6"`.
    pub fn summary_line(&self, index: usize) -> String {
        format!(
            "{index}. {} {} - Urgency: {}",
            self.date_str(),
            self.time_str(),
            self.urgency
        )
    }
}

// ── Classification ──────────────────────────────────────────────────

/// What an inbound message asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A symptom report carrying a rating. `text` is the full message.
    DataEntry { urgency: UrgencyRating, text: String },
    /// "link": reply with the shareable log URL.
    LinkQuery,
    /// "summary": reply with the most recent entries.
    SummaryQuery,
    Unrecognized,
}

// ── Outcome ─────────────────────────────────────────────────────────

/// Outcome of a successfully handled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Logged(UrgencyRating),
    LinkSent,
    SummarySent,
    NoUrgencyFound,
}

impl Outcome {
    /// Short label, also used as the webhook's `status` field.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Logged(_) => "logged",
            Self::LinkSent => "link sent",
            Self::SummarySent => "summary sent",
            Self::NoUrgencyFound => "no urgency found",
        }
    }
}

/// A handled message: the outcome and the reply that was delivered.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub outcome: Outcome,
    pub reply: String,
}
