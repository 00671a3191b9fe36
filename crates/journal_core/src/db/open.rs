//! Connection bootstrap.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a 5 second busy timeout.
//! - Returned connections are migrated to [`latest_version`].
//!
//! [`latest_version`]: super::migrations::latest_version

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating if needed) the database file at `path` and migrates it.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_logged(&path.display().to_string(), || Connection::open(path))
}

/// Opens a private in-memory database and migrates it.
///
/// Every call yields an independent, empty database.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_logged(":memory:", Connection::open_in_memory)
}

fn open_logged(
    target: &str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = connect().map_err(DbError::from).and_then(|mut conn| {
        prepare(&mut conn)?;
        Ok(conn)
    });
    let duration_ms = started_at.elapsed().as_millis();

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok target={target} duration_ms={duration_ms}"
        ),
        Err(err) => error!(
            "event=db_open module=db status=error target={target} duration_ms={duration_ms} error={err}"
        ),
    }
    result
}

fn prepare(conn: &mut Connection) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}
