//! Startup database connection.
//!
//! The relay keeps no state of its own; the database is opened once at
//! startup with a connected/error log outcome and plays no further role.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open (or create) the SQLite database at the given path.
pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {}", path.display()))?;

    // journal_mode PRAGMA always returns the resulting mode, so use query_row
    let _: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

    Ok(conn)
}
