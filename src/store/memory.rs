//! In-process store backed by an ordered map.

use super::{Deleted, KeyListing, KeyValueStore, StoredValue};
use crate::error::StoreResult;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, (String, bool)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<StoredValue>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).map(|(value, shared)| StoredValue {
            key: key.to_string(),
            value: value.clone(),
            shared: *shared,
        }))
    }

    async fn set(&self, key: &str, value: &str, shared: bool) -> StoreResult<StoredValue> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), (value.to_string(), shared));
        Ok(StoredValue {
            key: key.to_string(),
            value: value.to_string(),
            shared,
        })
    }

    async fn delete(&self, key: &str) -> StoreResult<Deleted> {
        self.entries.write().await.remove(key);
        Ok(Deleted {
            key: key.to_string(),
            deleted: true,
        })
    }

    async fn list(&self, prefix: &str) -> StoreResult<KeyListing> {
        let entries = self.entries.read().await;
        let keys = entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        Ok(KeyListing {
            keys,
            prefix: prefix.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let store = MemoryStore::new();
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_overwrites_and_list_filters_by_prefix() {
        let store = MemoryStore::new();
        store.set("tasks", "[]", false).await.unwrap();
        store.set("tasks", "[1]", true).await.unwrap();
        store.set("theme", "dark", false).await.unwrap();
        store.set("other", "x", false).await.unwrap();

        let entry = store.get("tasks").await.unwrap().unwrap();
        assert_eq!(entry.value, "[1]");
        assert!(entry.shared);

        let listing = store.list("t").await.unwrap();
        assert_eq!(listing.keys, vec!["tasks", "theme"]);
        assert_eq!(listing.prefix, "t");
        assert_eq!(store.list("").await.unwrap().keys.len(), 3);
    }

    #[tokio::test]
    async fn delete_is_acknowledged_even_when_absent() {
        let store = MemoryStore::new();
        store.set("k", "v", false).await.unwrap();

        let ack = store.delete("k").await.unwrap();
        assert!(ack.deleted);
        assert!(store.get("k").await.unwrap().is_none());

        assert!(store.delete("k").await.unwrap().deleted);
    }
}
