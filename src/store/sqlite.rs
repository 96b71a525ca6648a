//! SQLite-backed key-value store.

use super::{Deleted, KeyListing, KeyValueStore, StoredValue, now_ms};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Arc, Mutex};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Store handle wrapping a SQLite connection.
///
/// Every write is a single statement, so callers never observe a partially
/// written value.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;",
        )?;

        Self::with_connection(conn)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(mut conn: Connection) -> StoreResult<Self> {
        embedded::migrations::runner().run(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` with exclusive access to the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&conn)
        })
        .await?
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> StoreResult<Option<StoredValue>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let entry = conn
                .query_row(
                    "SELECT value, shared FROM kv_entries WHERE key = ?1",
                    params![key],
                    |row| {
                        Ok(StoredValue {
                            key: key.clone(),
                            value: row.get(0)?,
                            shared: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(entry)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str, shared: bool) -> StoreResult<StoredValue> {
        let entry = StoredValue {
            key: key.to_string(),
            value: value.to_string(),
            shared,
        };
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO kv_entries (key, value, shared, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     shared = excluded.shared,
                     updated_at = excluded.updated_at",
                params![entry.key, entry.value, entry.shared, now_ms()],
            )?;
            Ok(entry)
        })
        .await
    }

    async fn delete(&self, key: &str) -> StoreResult<Deleted> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
            Ok(Deleted { key, deleted: true })
        })
        .await
    }

    async fn list(&self, prefix: &str) -> StoreResult<KeyListing> {
        let prefix = prefix.to_string();
        self.with_conn(move |conn| {
            // substr comparison avoids LIKE wildcard escaping
            let mut stmt = conn.prepare(
                "SELECT key FROM kv_entries
                 WHERE substr(key, 1, length(?1)) = ?1
                 ORDER BY key",
            )?;
            let keys = stmt
                .query_map(params![prefix], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(KeyListing { keys, prefix })
        })
        .await
    }
}
