//! Version-tracked schema migrations for the health log.
//!
//! Each migration has a version number and SQL. `run_migrations()` checks
//! the current version and applies only the new ones, in order.

use libsql::Connection;

use crate::error::StoreError;

/// A single migration step.
struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// All migrations in order. Add new versions to the end.
static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "health_log",
        sql: r#"
            CREATE TABLE IF NOT EXISTS health_log (
                row_id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                body TEXT NOT NULL,
                urgency INTEGER NOT NULL CHECK (urgency BETWEEN 1 AND 10),
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
        "#,
    },
    Migration {
        version: 2,
        name: "health_log_date_index",
        sql: r#"
            CREATE INDEX IF NOT EXISTS idx_health_log_date ON health_log(date);
        "#,
    },
];

/// Apply every migration newer than the recorded schema version.
///
/// Each step and its `_migrations` record run in one transaction, so a
/// failed step leaves the version where it was.
pub async fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        (),
    )
    .await
    .map_err(|e| StoreError::Migration(format!("_migrations table: {e}")))?;

    let applied = schema_version(conn).await?;
    let pending = MIGRATIONS.iter().filter(|m| m.version > applied);

    for migration in pending {
        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applying health log migration"
        );
        let batch = format!(
            "BEGIN;\n{}\nINSERT INTO _migrations (version, name) VALUES ({}, '{}');\nCOMMIT;",
            migration.sql, migration.version, migration.name
        );
        if let Err(e) = conn.execute_batch(&batch).await {
            let _ = conn.execute("ROLLBACK", ()).await;
            return Err(StoreError::Migration(format!(
                "V{} {}: {e}",
                migration.version, migration.name
            )));
        }
    }

    Ok(())
}

/// Highest recorded migration version; 0 for a fresh database.
async fn schema_version(conn: &Connection) -> Result<i64, StoreError> {
    let fail = |e: libsql::Error| StoreError::Migration(format!("schema version: {e}"));

    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM _migrations", ())
        .await
        .map_err(fail)?;
    match rows.next().await.map_err(fail)? {
        Some(row) => row.get::<i64>(0).map_err(fail),
        None => Ok(0),
    }
}
