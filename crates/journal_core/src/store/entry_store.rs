//! Entry store contract and SQLite implementation.
//!
//! # Responsibility
//! - Translate create/read/update/delete/list into SQL against `entries`.
//! - Stamp `created_at` at insert time.
//!
//! # Invariants
//! - `update` is an upsert: a missing row is inserted, an existing row only
//!   has `title` and `content` rewritten.
//! - `delete` succeeds when no row matches.
//! - `list` returns every owner's rows, newest `created_at` first.

use crate::db::DbError;
use crate::model::entry::{Entry, EntryId};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    content,
    created_at
FROM entries";

const ENTRY_COLUMNS: [&str; 5] = ["id", "user_id", "title", "content", "created_at"];

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by entry persistence operations.
#[derive(Debug)]
pub enum StoreError {
    /// Engine failure, including constraint violations.
    Db(DbError),
    /// No row matched the requested id.
    NotFound(String),
    /// The id is not a well-formed UUID.
    InvalidId(String),
    /// A stored row could not be decoded.
    InvalidData(String),
    /// The connection was not migrated to the entries schema.
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl StoreError {
    /// Returns whether this error means the entry does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "entry not found: {id}"),
            Self::InvalidId(id) => write!(f, "invalid entry id `{id}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted entry data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for journal entries.
pub trait EntryStore {
    /// Inserts a new row and returns the entry as persisted.
    fn create(&self, entry: &Entry) -> StoreResult<Entry>;
    /// Loads one entry by id regardless of owner.
    fn read(&self, id: &str) -> StoreResult<Entry>;
    /// Writes the entry, inserting it when the id is unknown.
    fn update(&self, entry: &Entry) -> StoreResult<()>;
    /// Removes the entry; a missing row is not an error.
    fn delete(&self, id: &str) -> StoreResult<()>;
    /// Lists every entry, newest first.
    fn list(&self) -> StoreResult<Vec<Entry>>;
}

/// SQLite-backed entry store borrowing a migrated connection.
pub struct SqliteEntryStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after checking the `entries` schema is present.
    ///
    /// Intended for one-off startup checks; per-request construction should
    /// use [`SqliteEntryStore::new`].
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl EntryStore for SqliteEntryStore<'_> {
    fn create(&self, entry: &Entry) -> StoreResult<Entry> {
        let created_at = now_millis();

        self.conn.execute(
            "INSERT INTO entries (
                id,
                user_id,
                title,
                content,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                entry.id.to_string(),
                entry.owner_id.to_string(),
                entry.title.as_str(),
                entry.content.as_str(),
                created_at,
            ],
        )?;

        Ok(Entry {
            created_at: from_epoch_ms(created_at)?,
            ..entry.clone()
        })
    }

    fn read(&self, id: &str) -> StoreResult<Entry> {
        let entry_id = parse_entry_id(id)?;
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([entry_id.to_string()])?;
        match rows.next()? {
            Some(row) => parse_entry_row(row),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    fn update(&self, entry: &Entry) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO entries (
                id,
                user_id,
                title,
                content,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content;",
            params![
                entry.id.to_string(),
                entry.owner_id.to_string(),
                entry.title.as_str(),
                entry.content.as_str(),
                entry.created_at.timestamp_millis(),
            ],
        )?;

        Ok(())
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let entry_id = parse_entry_id(id)?;
        self.conn
            .execute("DELETE FROM entries WHERE id = ?1;", [entry_id.to_string()])?;
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<Entry>> {
        // rowid keeps insertion order among rows created in the same millisecond.
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL} ORDER BY created_at DESC, rowid DESC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }
}

fn parse_entry_id(value: &str) -> StoreResult<EntryId> {
    Uuid::parse_str(value).map_err(|_| StoreError::InvalidId(value.to_string()))
}

fn parse_entry_row(row: &Row<'_>) -> StoreResult<Entry> {
    let id = parse_stored_uuid(row.get("id")?, "id")?;
    let owner_id = parse_stored_uuid(row.get("user_id")?, "user_id")?;

    Ok(Entry {
        id,
        owner_id,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: from_epoch_ms(row.get("created_at")?)?,
    })
}

fn parse_stored_uuid(value: String, column: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(&value).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{value}` in entries.{column}"))
    })
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn from_epoch_ms(value: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(value).ok_or_else(|| {
        StoreError::InvalidData(format!("timestamp `{value}` out of range in entries.created_at"))
    })
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    if !table_exists(conn, "entries")? {
        return Err(StoreError::MissingRequiredTable("entries"));
    }

    for column in ENTRY_COLUMNS {
        if !table_has_column(conn, "entries", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "entries",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
