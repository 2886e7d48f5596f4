//! Health SMS: symptom logging over text messages.

pub mod channels;
pub mod checkin;
pub mod config;
pub mod error;
pub mod ingest;
pub mod routes;
pub mod store;
