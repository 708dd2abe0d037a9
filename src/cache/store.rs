//! Entry Store Module
//!
//! CRUD operations for single cache rows in a SQLite table, keyed by the
//! unique key name, with delete-then-insert upsert and expiry-aware reads.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, warn};

use crate::cache::entry::{from_millis, to_millis};
use crate::cache::{CacheEntry, MAX_PAYLOAD_SIZE};
use crate::error::{CacheError, Result};

// == Entry Store Trait ==
/// Persistence operations the cache façade is built on.
///
/// A missing row is reported as `Ok(None)`, never as an error.
pub trait EntryStore: Send + Sync {
    /// Removes any row with this key, then inserts a fresh one.
    ///
    /// The two steps are not atomic: a failure in between leaves the key absent.
    fn upsert(&self, key: &str, payload: &[u8], expires_at: DateTime<Utc>) -> Result<()>;

    /// Returns the live row for `key`, purging it instead if it has expired.
    fn read_by_key(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Hard-deletes the row for `key`. Missing keys are a no-op.
    fn delete_by_key(&self, key: &str) -> Result<()>;

    /// Hard-deletes every row, soft-deleted ones included.
    fn delete_all(&self) -> Result<()>;
}

// == SQLite Entry Store ==
/// SQLite-backed entry store.
///
/// The connection sits behind a mutex held for one statement at a time,
/// so concurrent callers interleave at statement granularity and the
/// unique index on `key_name` arbitrates racing writers.
#[derive(Clone)]
pub struct SqliteEntryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEntryStore {
    // == Constructors ==
    /// Opens (or creates) the database at `db_path` and ensures the schema.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                    message: format!("Failed to create cache directory {}", parent.display()),
                    source: e,
                })?;
            }
        }

        let conn = Connection::open(db_path).map_err(|e| CacheError::Database {
            message: format!("Failed to open cache database: {}", e),
            source: Some(e),
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::with_connection(conn)
    }

    /// Creates a store on a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Creates the table and its unique index if missing.
    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                deleted_at INTEGER,
                key_name TEXT NOT NULL,
                value BLOB NOT NULL CHECK (length(value) <= {max}),
                expired_at INTEGER NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_only_one_key_name
                ON cache_entries(key_name);

            CREATE INDEX IF NOT EXISTS idx_cache_entries_deleted_at
                ON cache_entries(deleted_at);
            "#,
            max = MAX_PAYLOAD_SIZE
        ))
        .map_err(|e| CacheError::Database {
            message: format!("Failed to initialize cache schema: {}", e),
            source: Some(e),
        })?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| CacheError::Internal(format!("Failed to lock database: {}", e)))
    }

    // == Insert ==
    /// Inserts a new row.
    ///
    /// Fails with a constraint violation if a row with the same key exists.
    pub fn insert(&self, entry: &CacheEntry) -> Result<i64> {
        check_payload_size(&entry.payload)?;

        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO cache_entries
            (created_at, updated_at, deleted_at, key_name, value, expired_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                to_millis(entry.created_at),
                to_millis(entry.updated_at),
                entry.deleted_at.map(to_millis),
                entry.key,
                entry.payload,
                to_millis(entry.expires_at),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    // == Soft Delete ==
    /// Marks the row as deleted without removing it.
    ///
    /// Soft-deleted rows are invisible to reads but still hold the key's
    /// unique slot until a hard delete removes them.
    pub fn soft_delete_by_key(&self, key: &str) -> Result<bool> {
        let now = to_millis(Utc::now());
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE cache_entries SET deleted_at = ?1, updated_at = ?1 \
             WHERE key_name = ?2 AND deleted_at IS NULL",
            params![now, key],
        )?;
        Ok(updated > 0)
    }

    // == Count ==
    /// Returns the number of rows, soft-deleted ones included.
    pub fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }

    fn find_live(&self, key: &str) -> Result<Option<CacheEntry>> {
        let conn = self.lock()?;
        let entry = conn
            .query_row(
                r#"
                SELECT id, created_at, updated_at, deleted_at, key_name, value, expired_at
                FROM cache_entries
                WHERE key_name = ?1 AND deleted_at IS NULL
                "#,
                params![key],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    // == Purge ==
    /// Removes an expired row by its id.
    ///
    /// Targets the exact row that was read, so a fresh row written for the
    /// same key in the meantime survives. Failures are logged, not returned.
    fn purge_expired(&self, entry: &CacheEntry) {
        let result = self.lock().and_then(|conn| {
            conn.execute("DELETE FROM cache_entries WHERE id = ?1", params![entry.id])
                .map_err(CacheError::from)
        });

        match result {
            Ok(_) => debug!("Purged expired cache entry {} (id {})", entry.key, entry.id),
            Err(e) => warn!("Failed to purge expired cache entry {}: {}", entry.key, e),
        }
    }
}

fn check_payload_size(payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(CacheError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }
    Ok(())
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<CacheEntry> {
    let millis = |idx: usize| -> rusqlite::Result<DateTime<Utc>> {
        let ms: i64 = row.get(idx)?;
        from_millis(ms).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
    };
    let deleted_at: Option<i64> = row.get(3)?;

    Ok(CacheEntry {
        id: row.get(0)?,
        created_at: millis(1)?,
        updated_at: millis(2)?,
        deleted_at: deleted_at.and_then(from_millis),
        key: row.get(4)?,
        payload: row.get(5)?,
        expires_at: millis(6)?,
    })
}

impl EntryStore for SqliteEntryStore {
    fn upsert(&self, key: &str, payload: &[u8], expires_at: DateTime<Utc>) -> Result<()> {
        // Reject before the delete so an oversized write keeps the old row
        check_payload_size(payload)?;
        let entry = CacheEntry::new(key, payload.to_vec(), expires_at);

        self.delete_by_key(key)?;
        let id = self.insert(&entry)?;
        debug!("Stored cache entry {} (id {})", key, id);
        Ok(())
    }

    fn read_by_key(&self, key: &str) -> Result<Option<CacheEntry>> {
        let entry = match self.find_live(key)? {
            Some(entry) => entry,
            None => return Ok(None),
        };

        if entry.is_expired() {
            // A failed purge still reports a miss; the next read retries it
            self.purge_expired(&entry);
            return Ok(None);
        }

        Ok(Some(entry))
    }

    fn delete_by_key(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM cache_entries WHERE key_name = ?1",
            params![key],
        )?;
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM cache_entries WHERE 1 = 1", [])?;
        debug!("Cleared {} cache entries", deleted);
        Ok(())
    }
}
