//! Urgency extraction.
//!
//! Messages follow a "rating then description" convention, so only the
//! leading whitespace-delimited token is inspected. Numbers later in the
//! text ("5 three days of pain", "2 took 400mg") are part of the
//! description and never read as the rating.

use super::types::UrgencyRating;

/// Longest digit run accepted as a rating token.
const MAX_RATING_DIGITS: usize = 2;

/// Sentence punctuation tolerated right after the rating ("7, bad day").
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!'];

/// Extract the urgency rating from the leading token of `body`.
///
/// Returns `None` when the first token is not a one- or two-digit number
/// in `1..=10`. Signs ("-5", "+5"), words ("five") and empty bodies are
/// all absent ratings, not errors.
pub fn extract_urgency(body: &str) -> Option<UrgencyRating> {
    let token = body.split_whitespace().next()?;
    let digits = token.trim_end_matches(TRAILING_PUNCTUATION);

    if digits.is_empty()
        || digits.len() > MAX_RATING_DIGITS
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    digits.parse::<u8>().ok().and_then(UrgencyRating::new)
}
