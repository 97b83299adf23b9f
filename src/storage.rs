//! Local persistence: a string-keyed, string-valued store in one `SQLite` file.
//!
//! ```text
//! <root>/lti.sqlite
//!   kv(key TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at TEXT NOT NULL)
//! ```
//!
//! Values are JSON documents. Each category of data lives in its own
//! [`Slot`]; typed accessors for the slots are split across the submodules.
//! Writes are last-writer-wins: two processes editing the same session will
//! overwrite each other.

mod meeting;
mod session;

use std::{fs, path::PathBuf};

use jiff::Timestamp;
use rusqlite::{Connection, OptionalExtension};
use serde::{Serialize, de::DeserializeOwned};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// One category of persisted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Isolations staged for the current meeting.
    Isolations,
    /// Responses recorded so far in the current session.
    Responses,
    /// Responses finalized at the most recent meeting.
    PreviousResponses,
    /// The isolation set reviewed at the most recent meeting.
    PreviousIsolations,
    /// Date and attendees of the meeting being prepared.
    CurrentMeeting,
    /// Everyone who has attended or may attend.
    People,
    /// Append-only history of finalized meetings.
    PastMeetings,
}

impl Slot {
    pub fn key(self) -> &'static str {
        match self {
            Self::Isolations => "session.isolations",
            Self::Responses => "session.responses",
            Self::PreviousResponses => "carryover.responses",
            Self::PreviousIsolations => "carryover.isolations",
            Self::CurrentMeeting => "meeting.current",
            Self::People => "people",
            Self::PastMeetings => "meetings.past",
        }
    }
}

/// Local `SQLite`-backed key-value store.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens (or creates) the store under the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Self::init(Connection::open(root.join("lti.sqlite"))?)
    }

    /// A throwaway store that lives only as long as the value.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }

    // ── Raw substrate ──

    /// Reads the raw value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, Timestamp::now().to_string()],
        )?;
        tracing::debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    /// Removes `key`. Idempotent.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }

    // ── Typed slots ──

    /// Reads a slot, degrading to the default when it is absent or unparseable.
    ///
    /// A value that no longer parses is logged and treated as empty rather
    /// than failing the caller. Database errors still propagate.
    fn read_slot<T: DeserializeOwned + Default>(&self, slot: Slot) -> Result<T> {
        let Some(raw) = self.get(slot.key())? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(slot = slot.key(), error = %e, "stored value is unreadable, treating as empty");
                Ok(T::default())
            }
        }
    }

    fn write_slot<T: Serialize + ?Sized>(&self, slot: Slot, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.set(slot.key(), &json)
    }

    fn clear_slot(&self, slot: Slot) -> Result<()> {
        self.remove(slot.key())
    }
}
