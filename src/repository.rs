//! Persistence of the whole task collection under a single store key.

use crate::error::RepositoryError;
use crate::store::KeyValueStore;
use crate::tasks::TaskCollection;
use std::sync::Arc;
use tracing::{debug, warn};

/// Key the collection is stored under unless configured otherwise.
pub const DEFAULT_TASKS_KEY: &str = "my-tasks";

/// Reads and writes the task collection as one JSON document.
#[derive(Clone)]
pub struct TaskRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl TaskRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, DEFAULT_TASKS_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Load the collection. Absent and undecodable data yield an empty
    /// collection; a failing store read is returned so callers never save
    /// over data they could not see.
    pub async fn load(&self) -> Result<TaskCollection, RepositoryError> {
        match self.load_checked().await {
            Ok(Some(tasks)) => {
                debug!(key = %self.key, count = tasks.len(), "Loaded tasks");
                Ok(tasks)
            }
            Ok(None) => {
                debug!(key = %self.key, "No saved tasks");
                Ok(TaskCollection::new())
            }
            Err(e @ RepositoryError::Decode { .. }) => {
                warn!(key = %self.key, error = %e, "Ignoring undecodable saved tasks");
                Ok(TaskCollection::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Load the collection, keeping "nothing stored" (`Ok(None)`) apart from
    /// "stored but unusable" (`Err`).
    pub async fn load_checked(&self) -> Result<Option<TaskCollection>, RepositoryError> {
        let Some(entry) = self.store.get(&self.key).await? else {
            return Ok(None);
        };
        if entry.value.is_empty() {
            return Ok(None);
        }
        let tasks = serde_json::from_str(&entry.value).map_err(|source| RepositoryError::Decode {
            key: self.key.clone(),
            source,
        })?;
        Ok(Some(tasks))
    }

    /// Replace the stored collection.
    pub async fn save(&self, tasks: &TaskCollection) -> Result<(), RepositoryError> {
        let encoded = serde_json::to_string(tasks).map_err(RepositoryError::Encode)?;
        self.store.set(&self.key, &encoded, false).await?;
        debug!(key = %self.key, count = tasks.len(), "Saved tasks");
        Ok(())
    }

    /// Remove the stored collection entirely.
    pub async fn clear(&self) -> Result<(), RepositoryError> {
        self.store.delete(&self.key).await?;
        Ok(())
    }
}
