//! Query execution against a resolved SQLite database file.
//!
//! One connection per request: opened here, health-checked, driven through
//! the supplied SQL (which may hold several semicolon-separated
//! statements), and dropped before control returns — success or failure.
//! No pooling, no retries, no timeouts.

use std::io::Write;
use std::path::Path;

use rusqlite::fallible_iterator::FallibleIterator;
use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection, OpenFlags};
use tracing::{debug, error};

use crate::error::GatewayError;
use crate::serialize::RowWriter;

/// A request-scoped database connection.
///
/// Dropping the value closes the connection, so every exit path from the
/// handler releases it.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open an existing database file and confirm it is queryable.
    ///
    /// The open flags deliberately omit `SQLITE_OPEN_CREATE`: the resolver
    /// has already confirmed the file exists, and a gateway must never
    /// materialize an empty database for a mistyped name. SQLite opens
    /// lazily, so a corrupt or non-database file only fails on first use —
    /// the open-time probes force that failure here instead of mid-stream.
    pub fn open(path: &Path) -> Result<Self, GatewayError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to open database");
            GatewayError::Connection(e)
        })?;

        let version: String = conn
            .query_row("SELECT sqlite_version()", [], |row| row.get(0))
            .map_err(|e| {
                error!(path = %path.display(), error = %e, "database failed health check");
                GatewayError::HealthCheck(e)
            })?;
        // sqlite_version() is computed without touching the pager;
        // schema_version forces the first page read, so a corrupt or
        // non-database file fails here rather than mid-stream.
        conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map_err(|e| {
                error!(path = %path.display(), error = %e, "database failed health check");
                GatewayError::HealthCheck(e)
            })?;
        debug!(path = %path.display(), version = %version, "connected to database");

        Ok(Self { conn })
    }

    /// Execute `sql` and stream every produced row into `writer`.
    ///
    /// All semicolon-separated statements run in sequence; each one that
    /// yields rows feeds the single combined stream. The first engine error
    /// aborts the run — rows already written stay written.
    pub fn run<W: Write>(&self, sql: &str, writer: &mut RowWriter<W>) -> Result<(), GatewayError> {
        let mut batch = Batch::new(&self.conn, sql);
        while let Some(mut stmt) = batch.next().map_err(GatewayError::Execution)? {
            // DDL/DML produces no columns and therefore no output lines
            if stmt.column_count() == 0 {
                stmt.raw_execute().map_err(GatewayError::Execution)?;
                continue;
            }

            let columns: Vec<String> = stmt
                .column_names()
                .iter()
                .map(|name| name.to_string())
                .collect();
            writer.begin_statement(&columns);

            let mut rows = stmt.raw_query();
            while let Some(row) = rows.next().map_err(GatewayError::Execution)? {
                let mut fields = Vec::with_capacity(columns.len());
                for idx in 0..columns.len() {
                    let value = row.get_ref(idx).map_err(GatewayError::Execution)?;
                    fields.push(field_text(value));
                }
                writer.write_row(&fields)?;
            }
        }
        Ok(())
    }
}

/// Engine value to wire text. `NULL` stays `None` and serializes as an
/// empty field; text and blob bytes are taken lossily as UTF-8.
fn field_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
