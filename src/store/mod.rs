//! Key-value storage for the planner.
//!
//! The planner only needs an opaque async map from string keys to string
//! payloads. `SqliteStore` is the durable default; `MemoryStore` keeps
//! everything in process.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A stored value together with its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    pub key: String,
    pub value: String,
    pub shared: bool,
}

/// Acknowledgement of a delete. `deleted` is always true, whether or not the
/// key existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub key: String,
    pub deleted: bool,
}

/// Keys found under a prefix, sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyListing {
    pub keys: Vec<String>,
    pub prefix: String,
}

/// Async key-value store contract.
///
/// A missing key is `Ok(None)` from `get`, never an error. Errors mean the
/// backend itself failed.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<StoredValue>>;

    /// Overwrite whatever is stored at `key`.
    async fn set(&self, key: &str, value: &str, shared: bool) -> StoreResult<StoredValue>;

    async fn delete(&self, key: &str) -> StoreResult<Deleted>;

    /// All keys starting with `prefix`; the empty prefix lists every key.
    async fn list(&self, prefix: &str) -> StoreResult<KeyListing>;
}

/// Get the current timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
