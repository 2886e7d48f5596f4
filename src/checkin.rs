//! Daily check-in trigger.
//!
//! An external scheduler calls the trigger endpoint with a shared secret.
//! Only an exact match lets the check-in prompt go out, and a failed send
//! after authorization is reported separately from a bad secret.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::channels::SmsTransport;
use crate::error::CheckInError;

/// Prompt sent to the user on each daily check-in.
pub const CHECKIN_PROMPT: &str = "How were your symptoms today? Rate urgency (1-10) and describe.";

/// Result of checking a trigger secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInDecision {
    pub authorized: bool,
    /// The prompt to send; empty when unauthorized.
    pub prompt_text: String,
}

/// Compare a provided trigger secret against the expected one.
///
/// Exact, case-sensitive equality. An empty provided secret never matches
/// a configured one.
pub fn authorize(provided: &str, expected: &str) -> CheckInDecision {
    if provided == expected {
        CheckInDecision {
            authorized: true,
            prompt_text: CHECKIN_PROMPT.to_string(),
        }
    } else {
        CheckInDecision {
            authorized: false,
            prompt_text: String::new(),
        }
    }
}

/// Gate for the scheduled check-in, built once from configuration.
pub struct CheckInGate {
    secret: SecretString,
    recipient: String,
    transport: Arc<dyn SmsTransport>,
}

impl CheckInGate {
    pub fn new(secret: SecretString, recipient: String, transport: Arc<dyn SmsTransport>) -> Self {
        Self {
            secret,
            recipient,
            transport,
        }
    }

    /// Check `provided` against the configured secret.
    pub fn authorize(&self, provided: &str) -> CheckInDecision {
        authorize(provided, self.secret.expose_secret())
    }

    /// Authorize and, if allowed, send the check-in prompt.
    ///
    /// A missing secret is treated like a wrong one.
    pub async fn trigger(&self, provided: Option<&str>) -> Result<(), CheckInError> {
        let decision = match provided {
            Some(secret) => self.authorize(secret),
            None => CheckInDecision {
                authorized: false,
                prompt_text: String::new(),
            },
        };

        if !decision.authorized {
            warn!("Unauthorized trigger attempt");
            return Err(CheckInError::Unauthorized);
        }

        self.transport
            .send(&self.recipient, &decision.prompt_text)
            .await?;
        info!(recipient = %self.recipient, "Daily check-in sent");
        Ok(())
    }
}

impl std::fmt::Debug for CheckInGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckInGate")
            .field("recipient", &self.recipient)
            .finish_non_exhaustive()
    }
}
