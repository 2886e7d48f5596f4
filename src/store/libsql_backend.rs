//! libSQL backend: async `SpreadsheetStore` implementation.
//!
//! One `health_log` row per entry. Append order (the autoincrement
//! `row_id`) is the authoritative ordering for "most recent" queries, so
//! two entries stamped in the same second still come back in the order
//! they were written.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::ingest::types::{DATE_FORMAT, HealthLogEntry, TIME_FORMAT, UrgencyRating};
use crate::store::migrations;
use crate::store::traits::SpreadsheetStore;

/// libSQL health log backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
    share_url: String,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path, share_url: impl Into<String>) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db, share_url.into()).await?;
        info!(path = %path.display(), "Health log opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory(share_url: impl Into<String>) -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;

        Self::from_database(db, share_url.into()).await
    }

    async fn from_database(db: LibSqlDatabase, share_url: String) -> Result<Self, StoreError> {
        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;

        Ok(Self {
            db: Arc::new(db),
            conn,
            share_url,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

const ENTRY_COLUMNS: &str = "date, time, body, urgency";

/// Map a libsql Row (ENTRY_COLUMNS order) to a HealthLogEntry.
fn row_to_entry(row: &libsql::Row) -> Result<HealthLogEntry, String> {
    let date_str: String = row.get(0).map_err(|e| e.to_string())?;
    let time_str: String = row.get(1).map_err(|e| e.to_string())?;
    let body: String = row.get(2).map_err(|e| e.to_string())?;
    let urgency: i64 = row.get(3).map_err(|e| e.to_string())?;

    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
        .map_err(|e| format!("bad date '{date_str}': {e}"))?;
    let time = NaiveTime::parse_from_str(&time_str, TIME_FORMAT)
        .map_err(|e| format!("bad time '{time_str}': {e}"))?;
    let urgency = u8::try_from(urgency)
        .ok()
        .and_then(UrgencyRating::new)
        .ok_or_else(|| format!("urgency {urgency} out of range"))?;

    Ok(HealthLogEntry {
        date,
        time,
        body,
        urgency,
    })
}

#[async_trait]
impl SpreadsheetStore for LibSqlBackend {
    async fn append(&self, entry: &HealthLogEntry) -> Result<(), StoreError> {
        self.conn()
            .execute(
                &format!("INSERT INTO health_log ({ENTRY_COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
                params![
                    entry.date_str(),
                    entry.time_str(),
                    entry.body.as_str(),
                    i64::from(entry.urgency.get()),
                ],
            )
            .await
            .map_err(|e| StoreError::Query(format!("append: {e}")))?;

        debug!(
            date = %entry.date_str(),
            time = %entry.time_str(),
            urgency = entry.urgency.get(),
            "Health log row appended"
        );
        Ok(())
    }

    async fn last_n(&self, n: usize) -> Result<Vec<HealthLogEntry>, StoreError> {
        if n == 0 {
            return Ok(Vec::new());
        }

        // No LIMIT: undecodable rows are skipped and older rows fill their place.
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {ENTRY_COLUMNS} FROM health_log ORDER BY row_id DESC"),
                (),
            )
            .await
            .map_err(|e| StoreError::Query(format!("last_n: {e}")))?;

        let mut entries = Vec::with_capacity(n);
        while entries.len() < n {
            let Some(row) = rows
                .next()
                .await
                .map_err(|e| StoreError::Query(format!("last_n: {e}")))?
            else {
                break;
            };
            match row_to_entry(&row) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping health log row: {e}"),
            }
        }
        Ok(entries)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let mut rows = self
            .conn()
            .query("SELECT COUNT(*) FROM health_log", ())
            .await
            .map_err(|e| StoreError::Query(format!("count: {e}")))?;

        let row = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("count: {e}")))?;

        match row {
            Some(row) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("count: {e}")))?;
                Ok(usize::try_from(count).unwrap_or(0))
            }
            None => Ok(0),
        }
    }

    fn shareable_url(&self) -> String {
        self.share_url.clone()
    }
}
