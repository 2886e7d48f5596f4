//! Outbound SMS channel.

pub mod sms;

pub use sms::{JoinSmsTransport, SmsTransport};
