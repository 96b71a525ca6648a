//! The task collection and the pure operations over it.
//!
//! Mutations never touch `self`; each returns a new collection so the caller
//! can keep its current value if persisting the new one fails.

use crate::error::ParseValueError;
use crate::types::{Category, Task, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Ordered sequence of tasks, the unit of persistence.
///
/// Encodes as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Pick an id for a new task: the clock reading, or one past the largest
    /// existing id when the clock has not moved past it. If the largest id is
    /// `i64::MAX`, the smallest unused positive id is taken instead.
    pub fn next_id(&self, now_ms: i64) -> TaskId {
        let max_existing = self.tasks.iter().map(|t| t.id.0).max();
        match max_existing {
            Some(max) if max >= now_ms => match max.checked_add(1) {
                Some(id) => TaskId(id),
                None => self.first_unused_id(),
            },
            _ => TaskId(now_ms),
        }
    }

    fn first_unused_id(&self) -> TaskId {
        let used: HashSet<i64> = self.tasks.iter().map(|t| t.id.0).collect();
        // A finite collection always leaves a gap.
        (1..=i64::MAX)
            .chain(i64::MIN..=0)
            .find(|id| !used.contains(id))
            .map_or(TaskId(0), TaskId)
    }

    /// Collection with `task` appended at the end.
    pub fn appended(&self, task: Task) -> Self {
        let mut tasks = self.tasks.clone();
        tasks.push(task);
        Self { tasks }
    }

    /// Collection with the completion flag of `id` flipped, or `None` if no
    /// task has that id.
    pub fn toggled(&self, id: TaskId) -> Option<Self> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        let mut tasks = self.tasks.clone();
        tasks[index].completed = !tasks[index].completed;
        Some(Self { tasks })
    }

    /// Collection without the task `id`, or `None` if no task has that id.
    pub fn without(&self, id: TaskId) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        let tasks = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        Some(Self { tasks })
    }

    /// Tasks matching `filter`, in insertion order.
    pub fn filtered(&self, filter: CategoryFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    /// Split the tasks matching `filter` into pending and completed, each in
    /// insertion order.
    pub fn partition(&self, filter: CategoryFilter) -> TaskPartition<'_> {
        let (completed, pending): (Vec<&Task>, Vec<&Task>) = self
            .tasks
            .iter()
            .filter(|t| filter.matches(t))
            .partition(|t| t.completed);
        TaskPartition { pending, completed }
    }

    /// Number of tasks in each category, in `Category::ALL` order.
    pub fn category_counts(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .iter()
            .map(|&category| {
                let count = self.tasks.iter().filter(|t| t.category == category).count();
                (category, count)
            })
            .collect()
    }
}

impl From<Vec<Task>> for TaskCollection {
    fn from(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

impl FromIterator<Task> for TaskCollection {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TaskCollection {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

/// Pending and completed views over a collection.
#[derive(Debug, Clone, Default)]
pub struct TaskPartition<'a> {
    pub pending: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

/// Category filter for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => task.category == *category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(category) => write!(f, "{}", category),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse::<Category>()
            .map(CategoryFilter::Only)
            .map_err(|_| ParseValueError::new("filter", s, "all, work, selfcare, exercise, home"))
    }
}
