//! Persistence layer: libSQL-backed health log.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::SpreadsheetStore;
