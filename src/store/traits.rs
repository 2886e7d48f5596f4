//! `SpreadsheetStore` trait: the append-only health log.
//!
//! Rows follow the fixed column order Date, Time, Body, Urgency. A header
//! row, where the backend has one, never counts as an entry.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::ingest::types::HealthLogEntry;

/// Backend-agnostic health log.
#[async_trait]
pub trait SpreadsheetStore: Send + Sync {
    /// Append one entry. A single append is atomic; there are no updates
    /// or deletes.
    async fn append(&self, entry: &HealthLogEntry) -> Result<(), StoreError>;

    /// The last `n` entries in append order, most recent first.
    async fn last_n(&self, n: usize) -> Result<Vec<HealthLogEntry>, StoreError>;

    /// Number of entries (data rows only).
    async fn count(&self) -> Result<usize, StoreError>;

    /// URL the user can open to view the whole log.
    fn shareable_url(&self) -> String;
}
