//! SMS transport: outbound text messages through an Android phone.
//!
//! The phone runs Tasker + Join; a GET to the configured Join endpoint with
//! the text (and recipient) as query parameters makes the phone send the
//! SMS. Inbound SMS arrive the other way, through `/android-webhook`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::TransportError;

/// Characters of message text included in log lines.
const LOG_PREVIEW_CHARS: usize = 50;

/// Outbound SMS delivery.
#[async_trait]
pub trait SmsTransport: Send + Sync {
    /// Send `text` to `recipient`. Implementations enforce their own
    /// timeout and report it as an ordinary failure.
    async fn send(&self, recipient: &str, text: &str) -> Result<(), TransportError>;
}

/// Join/Tasker HTTP transport.
pub struct JoinSmsTransport {
    send_url: String,
    client: reqwest::Client,
}

impl JoinSmsTransport {
    pub fn new(send_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::SendFailed {
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            send_url: send_url.into(),
            client,
        })
    }
}

#[async_trait]
impl SmsTransport for JoinSmsTransport {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), TransportError> {
        let resp = self
            .client
            .get(&self.send_url)
            .query(&[("message", text), ("recipient", recipient)])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to send SMS");
                TransportError::SendFailed {
                    reason: e.to_string(),
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "SMS endpoint rejected request");
            return Err(TransportError::Rejected {
                status: status.as_u16(),
            });
        }

        info!(
            recipient = recipient,
            preview = %preview(text),
            "SMS sent successfully"
        );
        Ok(())
    }
}

/// First few characters of a message, for logs.
pub(crate) fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
    if text.chars().count() > LOG_PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}
