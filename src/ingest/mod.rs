//! Inbound SMS ingestion.
//!
//! Every message delivered by the SMS webhook flows through:
//! 1. `IngestionService::ingest()`: payload validation
//! 2. `classifier::classify()`: keyword match, then urgency extraction
//! 3. The store (data entries) or a read query (link / summary)
//! 4. A single SMS reply to the sender, unless storage failed

pub mod classifier;
pub mod service;
pub mod types;
pub mod urgency;

pub use classifier::classify;
pub use service::IngestionService;
pub use types::{Classification, HealthLogEntry, InboundMessage, Ingested, Outcome, UrgencyRating};
pub use urgency::extract_urgency;
