//! Integration tests for the task pipeline.
//!
//! The pipeline runs against in-process stores and canned completion sources,
//! so no network or disk access is involved.

use async_trait::async_trait;
use day_planner::classifier::{Classifier, TextCompletion};
use day_planner::error::{ClassifyError, PipelineError, RepositoryError, StoreError, StoreResult};
use day_planner::pipeline::TaskPipeline;
use day_planner::repository::TaskRepository;
use day_planner::store::{Deleted, KeyListing, KeyValueStore, MemoryStore, StoredValue};
use day_planner::tasks::TaskCollection;
use day_planner::types::{
    Category, Classification, NewTask, Priority, Severity, Task, TaskId, TimeEstimate,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Completion source that always answers with the same text.
struct Fixed(&'static str);

#[async_trait]
impl TextCompletion for Fixed {
    async fn complete(&self, _prompt: &str) -> Result<String, ClassifyError> {
        Ok(self.0.to_string())
    }
}

/// Completion source that counts how often it is asked.
#[derive(Default)]
struct Counting {
    calls: AtomicUsize,
}

#[async_trait]
impl TextCompletion for Counting {
    async fn complete(&self, _prompt: &str) -> Result<String, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ClassifyError::EmptyContent)
    }
}

/// Store wrapper that counts writes.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    writes: AtomicUsize,
}

#[async_trait]
impl KeyValueStore for CountingStore {
    async fn get(&self, key: &str) -> StoreResult<Option<StoredValue>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, shared: bool) -> StoreResult<StoredValue> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, shared).await
    }

    async fn delete(&self, key: &str) -> StoreResult<Deleted> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> StoreResult<KeyListing> {
        self.inner.list(prefix).await
    }
}

/// Store whose reads succeed and whose writes always fail.
#[derive(Default)]
struct ReadOnlyStore {
    inner: MemoryStore,
}

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, key: &str) -> StoreResult<Option<StoredValue>> {
        self.inner.get(key).await
    }

    async fn set(&self, _key: &str, _value: &str, _shared: bool) -> StoreResult<StoredValue> {
        Err(StoreError::Unavailable("read-only".into()))
    }

    async fn delete(&self, _key: &str) -> StoreResult<Deleted> {
        Err(StoreError::Unavailable("read-only".into()))
    }

    async fn list(&self, prefix: &str) -> StoreResult<KeyListing> {
        self.inner.list(prefix).await
    }
}

/// Store whose reads fail while `failing` is set.
#[derive(Default)]
struct FlakyReadStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

#[async_trait]
impl KeyValueStore for FlakyReadStore {
    async fn get(&self, key: &str) -> StoreResult<Option<StoredValue>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("database is locked".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, shared: bool) -> StoreResult<StoredValue> {
        self.inner.set(key, value, shared).await
    }

    async fn delete(&self, key: &str) -> StoreResult<Deleted> {
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> StoreResult<KeyListing> {
        self.inner.list(prefix).await
    }
}

const LOW_REPLY: &str = r#"{"priority":"low","time":"15m","severity":"LOW"}"#;

fn fixed_clock() -> i64 {
    1_700_000_000_000
}

fn pipeline_with(store: Arc<dyn KeyValueStore>, reply: &'static str) -> TaskPipeline {
    TaskPipeline::new(
        TaskRepository::new(store),
        Classifier::new(Arc::new(Fixed(reply))),
    )
    .with_clock(fixed_clock)
}

fn task(id: i64, title: &str) -> Task {
    Task::new(
        TaskId(id),
        NewTask::new(title, "", Category::Work),
        Classification::fallback(),
    )
}

async fn seed(store: &Arc<dyn KeyValueStore>, tasks: Vec<Task>) {
    TaskRepository::new(store.clone())
        .save(&TaskCollection::from(tasks))
        .await
        .expect("seeding tasks");
}

mod add_tests {
    use super::*;

    #[tokio::test]
    async fn add_classifies_and_persists() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(store.clone(), LOW_REPLY);

        let added = pipeline
            .add_task(NewTask::new("Buy groceries", "", Category::Home))
            .await
            .unwrap()
            .expect("task should be added");

        assert_eq!(added.task.id, TaskId(fixed_clock()));
        assert_eq!(added.task.title, "Buy groceries");
        assert_eq!(added.task.category, Category::Home);
        assert_eq!(added.task.priority, Priority::Low);
        assert_eq!(added.task.time, TimeEstimate::FifteenMinutes);
        assert_eq!(added.task.severity, Severity::Low);
        assert!(!added.task.completed);
        assert_eq!(added.tasks.len(), 1);

        let stored = TaskRepository::new(store).load().await.unwrap();
        assert_eq!(stored, added.tasks);
    }

    #[tokio::test]
    async fn add_appends_after_existing_tasks() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        seed(&store, vec![task(1, "First")]).await;
        let pipeline = pipeline_with(store, LOW_REPLY);

        let added = pipeline
            .add_task(NewTask::new("Second", "", Category::Work))
            .await
            .unwrap()
            .unwrap();

        let titles: Vec<&str> = added.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn add_uses_fallback_when_classifier_fails() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(store, "not json at all");

        let added = pipeline
            .add_task(NewTask::new("Stretch", "ten minutes", Category::Exercise))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(added.task.classification(), Classification::fallback());
        assert_eq!(added.task.description, "ten minutes");
    }

    #[tokio::test]
    async fn blank_title_touches_nothing() {
        let store = Arc::new(CountingStore::default());
        let completion = Arc::new(Counting::default());
        let pipeline = TaskPipeline::new(
            TaskRepository::new(store.clone()),
            Classifier::new(completion.clone()),
        );

        for title in ["", "   ", "\t\n"] {
            let result = pipeline
                .add_task(NewTask::new(title, "details", Category::Work))
                .await
                .unwrap();
            assert!(result.is_none());
        }

        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn add_after_largest_possible_id() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        seed(&store, vec![task(i64::MAX, "Far future")]).await;
        let pipeline = pipeline_with(store, LOW_REPLY);

        let added = pipeline
            .add_task(NewTask::new("y", "", Category::Work))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(added.task.id, TaskId(1));
        assert_eq!(added.tasks.len(), 2);
        assert_eq!(pipeline.tasks().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn ids_stay_unique_when_clock_stands_still() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(store, LOW_REPLY);

        let mut ids = Vec::new();
        for title in ["a", "b", "c"] {
            let added = pipeline
                .add_task(NewTask::new(title, "", Category::Work))
                .await
                .unwrap()
                .unwrap();
            ids.push(added.task.id);
        }

        assert_eq!(
            ids,
            vec![
                TaskId(fixed_clock()),
                TaskId(fixed_clock() + 1),
                TaskId(fixed_clock() + 2)
            ]
        );
    }
}

mod mutation_tests {
    use super::*;

    #[tokio::test]
    async fn toggle_twice_restores_state() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        seed(&store, vec![task(1, "Write report")]).await;
        let pipeline = pipeline_with(store.clone(), LOW_REPLY);

        let first = pipeline.toggle_complete(TaskId(1)).await.unwrap();
        assert!(first.changed);
        assert!(first.tasks.get(TaskId(1)).unwrap().completed);
        assert!(pipeline.tasks().await.unwrap().get(TaskId(1)).unwrap().completed);

        let second = pipeline.toggle_complete(TaskId(1)).await.unwrap();
        assert!(second.changed);
        assert!(!second.tasks.get(TaskId(1)).unwrap().completed);
        assert!(!pipeline.tasks().await.unwrap().get(TaskId(1)).unwrap().completed);
    }

    #[tokio::test]
    async fn delete_removes_only_target() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        seed(&store, vec![task(1, "One"), task(2, "Two")]).await;
        let pipeline = pipeline_with(store, LOW_REPLY);

        let result = pipeline.delete_task(TaskId(1)).await.unwrap();

        assert!(result.changed);
        assert_eq!(result.tasks.len(), 1);
        assert!(result.tasks.contains(TaskId(2)));
        assert_eq!(pipeline.tasks().await.unwrap(), result.tasks);
    }

    #[tokio::test]
    async fn absent_id_is_a_no_op_without_writes() {
        let store = Arc::new(CountingStore::default());
        let pipeline = TaskPipeline::new(
            TaskRepository::new(store.clone()),
            Classifier::disabled(),
        );
        pipeline
            .repository()
            .save(&TaskCollection::from(vec![task(1, "Only")]))
            .await
            .unwrap();
        let writes_before = store.writes.load(Ordering::SeqCst);

        let toggled = pipeline.toggle_complete(TaskId(99)).await.unwrap();
        let deleted = pipeline.delete_task(TaskId(99)).await.unwrap();

        assert!(!toggled.changed);
        assert!(!deleted.changed);
        assert_eq!(toggled.tasks.len(), 1);
        assert_eq!(deleted.tasks.len(), 1);
        assert_eq!(store.writes.load(Ordering::SeqCst), writes_before);
    }

    #[tokio::test]
    async fn clear_empties_the_list() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        seed(&store, vec![task(1, "One")]).await;
        let pipeline = pipeline_with(store.clone(), LOW_REPLY);

        pipeline.clear().await.unwrap();

        assert!(pipeline.tasks().await.unwrap().is_empty());
        assert!(store.get("my-tasks").await.unwrap().is_none());
    }
}

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn save_failure_propagates_from_add() {
        let pipeline = pipeline_with(Arc::new(ReadOnlyStore::default()), LOW_REPLY);

        let result = pipeline
            .add_task(NewTask::new("Call dentist", "", Category::SelfCare))
            .await;

        assert!(matches!(result, Err(PipelineError::Repository(_))));
        assert!(pipeline.tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_failure_propagates_from_toggle_and_delete() {
        let store = Arc::new(ReadOnlyStore::default());
        store
            .inner
            .set(
                "my-tasks",
                &serde_json::to_string(&vec![task(1, "One")]).unwrap(),
                false,
            )
            .await
            .unwrap();
        let pipeline = pipeline_with(store, LOW_REPLY);

        assert!(pipeline.toggle_complete(TaskId(1)).await.is_err());
        assert!(pipeline.delete_task(TaskId(1)).await.is_err());

        // The stored collection is untouched.
        let tasks = pipeline.tasks().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(!tasks.get(TaskId(1)).unwrap().completed);
    }

    #[tokio::test]
    async fn read_failure_aborts_intents_without_overwriting() {
        let store = Arc::new(FlakyReadStore::default());
        TaskRepository::new(store.clone())
            .save(&TaskCollection::from((1..=5).map(|i| task(i, "kept")).collect::<Vec<_>>()))
            .await
            .unwrap();
        let pipeline = pipeline_with(store.clone(), LOW_REPLY);

        store.failing.store(true, Ordering::SeqCst);
        let added = pipeline
            .add_task(NewTask::new("Lost?", "", Category::Work))
            .await;
        let toggled = pipeline.toggle_complete(TaskId(1)).await;
        let deleted = pipeline.delete_task(TaskId(2)).await;
        let listed = pipeline.tasks().await;
        store.failing.store(false, Ordering::SeqCst);

        for result in [added.map(|_| ()), toggled.map(|_| ()), deleted.map(|_| ()), listed.map(|_| ())] {
            assert!(matches!(
                result,
                Err(PipelineError::Repository(RepositoryError::Store(_)))
            ));
        }

        let tasks = pipeline.tasks().await.unwrap();
        assert_eq!(tasks.len(), 5);
        assert!(tasks.iter().all(|t| !t.completed));
    }

    #[tokio::test]
    async fn corrupt_stored_data_starts_fresh() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set("my-tasks", "{not json", false).await.unwrap();
        let pipeline = pipeline_with(store, LOW_REPLY);

        assert!(pipeline.tasks().await.unwrap().is_empty());
        let added = pipeline
            .add_task(NewTask::new("Recover", "", Category::Work))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(added.tasks.len(), 1);
    }
}

mod concurrency_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_lose_nothing() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let pipeline = Arc::new(pipeline_with(store, LOW_REPLY));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let pipeline = pipeline.clone();
                tokio::spawn(async move {
                    pipeline
                        .add_task(NewTask::new(format!("task {}", i), "", Category::Work))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let tasks = pipeline.tasks().await.unwrap();
        assert_eq!(tasks.len(), 16);
        let mut ids: Vec<i64> = tasks.iter().map(|t| t.id.0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 16);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_toggles_and_deletes_lose_nothing() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        seed(&store, (1..=20).map(|i| task(i, "task")).collect()).await;
        let pipeline = Arc::new(pipeline_with(store, LOW_REPLY));

        // Toggle the odd ids, delete the even ones.
        let handles: Vec<_> = (1..=20)
            .map(|i| {
                let pipeline = pipeline.clone();
                tokio::spawn(async move {
                    if i % 2 == 1 {
                        pipeline.toggle_complete(TaskId(i)).await
                    } else {
                        pipeline.delete_task(TaskId(i)).await
                    }
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().unwrap().changed);
        }

        let tasks = pipeline.tasks().await.unwrap();
        assert_eq!(tasks.len(), 10);
        assert!(tasks.iter().all(|t| t.id.0 % 2 == 1 && t.completed));
    }
}
