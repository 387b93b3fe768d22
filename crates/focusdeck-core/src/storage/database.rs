//! SQLite-backed document store.
//!
//! Holds:
//! - The current application document under [`STATE_KEY`] in the kv table
//! - A ring of previous documents in `snapshots`, one per save
//! - Any other small key-value state

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::data_dir;
use crate::app::AppState;
use crate::error::StorageError;

/// kv key of the application document.
pub const STATE_KEY: &str = "app_state";

const DEFAULT_BACKUP_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub id: i64,
    pub saved_at: DateTime<Utc>,
    /// `None` when the stored document no longer parses.
    pub task_count: Option<usize>,
    pub bytes: usize,
}

/// SQLite database holding the application document.
pub struct Database {
    conn: Connection,
    backup_limit: usize,
}

impl Database {
    /// Open the database at `~/.config/focusdeck/focusdeck.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&data_dir()?.join("focusdeck.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(Duration::from_secs(2))?;
        let db = Self {
            conn,
            backup_limit: DEFAULT_BACKUP_LIMIT,
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn,
            backup_limit: DEFAULT_BACKUP_LIMIT,
        };
        db.migrate()?;
        Ok(db)
    }

    /// How many previous documents to keep. Zero disables snapshots.
    pub fn with_backup_limit(mut self, limit: usize) -> Self {
        self.backup_limit = limit;
        self
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS snapshots (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                saved_at TEXT NOT NULL,
                value    TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // ── Application document ─────────────────────────────────────────

    /// Load the document. A document that no longer parses is replaced by
    /// the newest snapshot that does, and failing that by an empty state.
    ///
    /// A document that loads differently from how it was stored (tasks or
    /// groups missing ids, unreadable dates) is written back at once, so
    /// ids minted on load stay stable. The stored text becomes a snapshot.
    pub fn load_state(&self) -> Result<AppState, StorageError> {
        let (state, stale) = self.read_state()?;
        if stale {
            debug!("stored document normalized on load");
            self.save_state(&state, Utc::now())?;
        }
        Ok(state)
    }

    /// Read, change and write the document inside one write transaction,
    /// so edits made by other processes in between are never overwritten.
    /// `f` returns `None` when it changed nothing worth saving.
    pub fn update_state<T>(
        &self,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut AppState) -> Option<T>,
    ) -> Result<Option<T>, StorageError> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let (mut state, stale) = self.read_state()?;
        let out = f(&mut state);
        let trimmed = if out.is_some() || stale {
            self.write_state(&tx, &state, now)?
        } else {
            0
        };
        tx.commit()?;
        if trimmed > 0 {
            debug!(trimmed, "trimmed old snapshots");
        }
        Ok(out)
    }

    /// The parsed document, and whether it differs from the stored text.
    fn read_state(&self) -> Result<(AppState, bool), StorageError> {
        let Some(raw) = self.kv_get(STATE_KEY)? else {
            return Ok((AppState::default(), false));
        };
        match serde_json::from_str::<AppState>(&raw) {
            Ok(state) => {
                let stale = encode(&state)? != raw;
                Ok((state, stale))
            }
            Err(e) => {
                warn!(error = %e, "stored document is unreadable, trying snapshots");
                Ok((self.newest_readable_snapshot()?, false))
            }
        }
    }

    fn newest_readable_snapshot(&self) -> Result<AppState, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, value FROM snapshots ORDER BY id DESC")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (id, raw) = row?;
            if let Ok(state) = serde_json::from_str(&raw) {
                warn!(snapshot = id, "recovered from snapshot");
                return Ok(state);
            }
        }
        warn!("no readable snapshot, starting empty");
        Ok(AppState::default())
    }

    /// Store `state`, moving the previous document into the snapshot ring.
    pub fn save_state(&self, state: &AppState, now: DateTime<Utc>) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        let trimmed = self.write_state(&tx, state, now)?;
        tx.commit()?;
        if trimmed > 0 {
            debug!(trimmed, "trimmed old snapshots");
        }
        Ok(())
    }

    /// Snapshot the previous document, store `state`, trim the ring.
    /// Returns how many snapshots were trimmed. Runs inside `tx`.
    fn write_state(&self, tx: &Connection, state: &AppState, now: DateTime<Utc>) -> Result<usize, StorageError> {
        let raw = encode(state)?;
        let previous = tx
            .query_row("SELECT value FROM kv WHERE key = ?1", params![STATE_KEY], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        if self.backup_limit > 0 {
            if let Some(previous) = previous.filter(|p| *p != raw) {
                tx.execute(
                    "INSERT INTO snapshots (saved_at, value) VALUES (?1, ?2)",
                    params![now.to_rfc3339(), previous],
                )?;
            }
        }
        tx.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![STATE_KEY, raw],
        )?;
        let trimmed = tx.execute(
            "DELETE FROM snapshots WHERE id NOT IN
                (SELECT id FROM snapshots ORDER BY id DESC LIMIT ?1)",
            params![self.backup_limit as i64],
        )?;
        Ok(trimmed)
    }

    /// Snapshots, newest first.
    pub fn list_snapshots(&self) -> Result<Vec<SnapshotInfo>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, saved_at, value FROM snapshots ORDER BY id DESC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, saved_at, raw) = row?;
            let saved_at = DateTime::parse_from_rfc3339(&saved_at)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| StorageError::Corrupt {
                    key: format!("snapshot {id}"),
                    message: e.to_string(),
                })?;
            let task_count = serde_json::from_str::<AppState>(&raw)
                .ok()
                .map(|s| s.board.task_count());
            out.push(SnapshotInfo {
                id,
                saved_at,
                task_count,
                bytes: raw.len(),
            });
        }
        Ok(out)
    }

    /// Make snapshot `id` the current document. The document it replaces
    /// becomes a snapshot itself, so a restore can be undone.
    pub fn restore_snapshot(&self, id: i64, now: DateTime<Utc>) -> Result<AppState, StorageError> {
        let raw = self
            .conn
            .query_row("SELECT value FROM snapshots WHERE id = ?1", params![id], |row| {
                row.get::<_, String>(0)
            })
            .optional()?
            .ok_or(StorageError::SnapshotNotFound(id))?;
        let state: AppState = serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            key: format!("snapshot {id}"),
            message: e.to_string(),
        })?;
        self.save_state(&state, now)?;
        Ok(state)
    }
}

fn encode(state: &AppState) -> Result<String, StorageError> {
    serde_json::to_string(state).map_err(|e| StorageError::Corrupt {
        key: STATE_KEY.to_string(),
        message: e.to_string(),
    })
}
