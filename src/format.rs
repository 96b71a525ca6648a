//! Output formatting utilities for markdown and JSON.

use crate::tasks::{CategoryFilter, TaskCollection};
use crate::types::{Priority, Task};
use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use std::str::FromStr;

/// Output format for task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown format '{}', expected markdown or json", other)),
        }
    }
}

/// Format a single task in short form for lists.
pub fn format_task_short(task: &Task) -> String {
    let check = if task.completed { "x" } else { " " };
    let priority_marker = match task.priority {
        Priority::High => "!!! ",
        Priority::Medium | Priority::Low => "",
    };
    format!(
        "- [{}] {}{} `{}` ({}, {}, {}, {})\n",
        check,
        priority_marker,
        task.title,
        task.id,
        task.category.label(),
        task.priority,
        task.time,
        task.severity,
    )
}

/// Format the collection as markdown: a header with the local weekday and
/// time, a category bar with counts, then pending tasks, then completed ones,
/// restricted to `filter`.
pub fn format_tasks_markdown(tasks: &TaskCollection, filter: CategoryFilter) -> String {
    format_tasks_markdown_at(tasks, filter, Local::now().naive_local())
}

/// Same as [`format_tasks_markdown`] with an explicit clock reading.
pub fn format_tasks_markdown_at(
    tasks: &TaskCollection,
    filter: CategoryFilter,
    now: NaiveDateTime,
) -> String {
    let mut md = String::new();
    let partition = tasks.partition(filter);

    md.push_str("# Let's Plan Your Day!\n\n");
    md.push_str(&format!("{}\n\n", now.format("%A, %H:%M")));
    md.push_str(&format!(
        "You have {} tasks for today\n\n",
        partition.pending.len()
    ));

    let mut bar = vec![format!("All Tasks ({})", tasks.len())];
    for (category, count) in tasks.category_counts() {
        bar.push(format!("{} ({})", category.label(), count));
    }
    md.push_str(&bar.join(" | "));
    md.push_str("\n\n");

    md.push_str(&format!("## Today's Tasks ({})\n\n", partition.pending.len()));
    if partition.pending.is_empty() {
        md.push_str("No pending tasks! Add one to get started.\n");
    } else {
        for task in &partition.pending {
            md.push_str(&format_task_short(task));
            if !task.description.is_empty() {
                md.push_str(&format!("  {}\n", task.description));
            }
        }
    }

    if !partition.completed.is_empty() {
        md.push_str(&format!("\n## Completed ({})\n\n", partition.completed.len()));
        for task in &partition.completed {
            md.push_str(&format_task_short(task));
        }
    }

    md
}

/// Format the tasks matching `filter` as a pretty JSON array.
pub fn format_tasks_json(tasks: &TaskCollection, filter: CategoryFilter) -> Result<String> {
    Ok(serde_json::to_string_pretty(&tasks.filtered(filter))?)
}

pub fn format_tasks(
    tasks: &TaskCollection,
    filter: CategoryFilter,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(format_tasks_markdown(tasks, filter)),
        OutputFormat::Json => format_tasks_json(tasks, filter),
    }
}
