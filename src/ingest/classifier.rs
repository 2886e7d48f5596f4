//! Message classification.
//!
//! Exact keyword matches ("link", "summary") are checked first and always
//! win. Anything else is a data entry if its leading token is a valid
//! urgency rating, and unrecognized otherwise.

use tracing::debug;

use super::types::Classification;
use super::urgency::extract_urgency;

/// Keyword requesting the shareable log URL.
pub const LINK_KEYWORD: &str = "link";
/// Keyword requesting the recent-entries summary.
pub const SUMMARY_KEYWORD: &str = "summary";

/// Classify a message body.
pub fn classify(body: &str) -> Classification {
    let text = body.trim();
    let normalized = text.to_lowercase();

    if normalized == LINK_KEYWORD {
        return Classification::LinkQuery;
    }
    if normalized == SUMMARY_KEYWORD {
        return Classification::SummaryQuery;
    }

    // Extraction reads the original text, not the case-folded copy.
    match extract_urgency(text) {
        Some(urgency) => {
            debug!(urgency = urgency.get(), "Message classified as data entry");
            Classification::DataEntry {
                urgency,
                text: text.to_string(),
            }
        }
        None => Classification::Unrecognized,
    }
}
