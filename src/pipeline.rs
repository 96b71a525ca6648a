//! Add, toggle and delete intents over the persisted task collection.
//!
//! Each intent is one load-mutate-save cycle. Cycles are serialized through a
//! write lock so two intents never start from the same stale collection. The
//! classification call for a new task runs before the lock is taken.

use crate::classifier::Classifier;
use crate::error::PipelineResult;
use crate::repository::TaskRepository;
use crate::store::now_ms;
use crate::tasks::TaskCollection;
use crate::types::{NewTask, Task, TaskId};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Result of a successful add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Added {
    pub task: Task,
    pub tasks: TaskCollection,
}

/// Result of a toggle or delete. `changed` is false when the id was not found;
/// nothing is written in that case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub tasks: TaskCollection,
    pub changed: bool,
}

/// Orchestrates classification and persistence for user intents.
pub struct TaskPipeline {
    repository: TaskRepository,
    classifier: Classifier,
    write_lock: Mutex<()>,
    clock: fn() -> i64,
}

impl TaskPipeline {
    pub fn new(repository: TaskRepository, classifier: Classifier) -> Self {
        Self {
            repository,
            classifier,
            write_lock: Mutex::new(()),
            clock: now_ms,
        }
    }

    /// Replace the millisecond clock used for new ids.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn repository(&self) -> &TaskRepository {
        &self.repository
    }

    /// Current collection, for read-only queries.
    pub async fn tasks(&self) -> PipelineResult<TaskCollection> {
        Ok(self.repository.load().await?)
    }

    /// Classify and store a new task.
    ///
    /// Returns `Ok(None)` without touching the classifier or the store when
    /// the title is blank.
    pub async fn add_task(&self, input: NewTask) -> PipelineResult<Option<Added>> {
        if !input.has_title() {
            debug!("Ignoring new task with a blank title");
            return Ok(None);
        }

        let classification = self.classifier.classify(&input).await;

        let _guard = self.write_lock.lock().await;
        let current = self.repository.load().await?;
        let task = Task::new(current.next_id((self.clock)()), input, classification);
        let tasks = current.appended(task.clone());
        self.repository.save(&tasks).await?;

        info!(
            id = %task.id,
            category = %task.category,
            priority = %task.priority,
            time = %task.time,
            severity = %task.severity,
            "Task added"
        );
        Ok(Some(Added { task, tasks }))
    }

    /// Flip the completion flag of a task.
    pub async fn toggle_complete(&self, id: TaskId) -> PipelineResult<Mutation> {
        let _guard = self.write_lock.lock().await;
        let current = self.repository.load().await?;
        let Some(tasks) = current.toggled(id) else {
            debug!(id = %id, "Toggle ignored, task not found");
            return Ok(Mutation {
                tasks: current,
                changed: false,
            });
        };
        self.repository.save(&tasks).await?;
        info!(id = %id, "Task completion toggled");
        Ok(Mutation {
            tasks,
            changed: true,
        })
    }

    /// Remove a task.
    pub async fn delete_task(&self, id: TaskId) -> PipelineResult<Mutation> {
        let _guard = self.write_lock.lock().await;
        let current = self.repository.load().await?;
        let Some(tasks) = current.without(id) else {
            debug!(id = %id, "Delete ignored, task not found");
            return Ok(Mutation {
                tasks: current,
                changed: false,
            });
        };
        self.repository.save(&tasks).await?;
        info!(id = %id, "Task deleted");
        Ok(Mutation {
            tasks,
            changed: true,
        })
    }

    /// Delete the whole stored collection.
    pub async fn clear(&self) -> PipelineResult<()> {
        let _guard = self.write_lock.lock().await;
        self.repository.clear().await?;
        info!(key = %self.repository.key(), "All tasks cleared");
        Ok(())
    }
}
