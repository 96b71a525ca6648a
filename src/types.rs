//! Core types for the planner.

use crate::error::ParseValueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task identifier: milliseconds since the Unix epoch at creation time,
/// bumped when needed to stay unique within the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TaskId)
    }
}

/// Normalize user or model supplied text before matching it against an enumeration.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Task category, chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Work,
    SelfCare,
    Exercise,
    Home,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Work,
        Category::SelfCare,
        Category::Exercise,
        Category::Home,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::SelfCare => "selfcare",
            Category::Exercise => "exercise",
            Category::Home => "home",
        }
    }

    /// Human-readable name for headings and filter bars.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::SelfCare => "Self Care",
            Category::Exercise => "Exercise",
            Category::Home => "Home",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "work" => Ok(Category::Work),
            "selfcare" | "self-care" | "self care" => Ok(Category::SelfCare),
            "exercise" => Ok(Category::Exercise),
            "home" => Ok(Category::Home),
            _ => Err(ParseValueError::new(
                "category",
                s,
                "work, selfcare, exercise, home",
            )),
        }
    }
}

/// Priority assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(ParseValueError::new("priority", s, "high, medium, low")),
        }
    }
}

/// Estimated time to finish a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeEstimate {
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[default]
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHours,
}

impl TimeEstimate {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeEstimate::FifteenMinutes => "15m",
            TimeEstimate::ThirtyMinutes => "30m",
            TimeEstimate::OneHour => "1h",
            TimeEstimate::TwoHours => "2h",
        }
    }
}

impl fmt::Display for TimeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeEstimate {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "15m" => Ok(TimeEstimate::FifteenMinutes),
            "30m" => Ok(TimeEstimate::ThirtyMinutes),
            "1h" => Ok(TimeEstimate::OneHour),
            "2h" => Ok(TimeEstimate::TwoHours),
            _ => Err(ParseValueError::new("time", s, "15m, 30m, 1h, 2h")),
        }
    }
}

/// Severity label assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    #[default]
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "critical" => Ok(Severity::Critical),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(ParseValueError::new("severity", s, "CRITICAL, MEDIUM, LOW")),
        }
    }
}

/// Output of the classifier. `Default` is the fallback triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Classification {
    pub priority: Priority,
    pub time: TimeEstimate,
    pub severity: Severity,
}

impl Classification {
    /// The fixed values used whenever classification fails.
    pub fn fallback() -> Self {
        Self::default()
    }
}

/// User input for a new task, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub category: Category,
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>, category: Category) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category,
        }
    }

    /// A task may only be created with a title that is not blank.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub time: TimeEstimate,
    pub severity: Severity,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Build a pending task from user input and its classification.
    pub fn new(id: TaskId, input: NewTask, classification: Classification) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            category: input.category,
            priority: classification.priority,
            time: classification.time,
            severity: classification.severity,
            completed: false,
        }
    }

    pub fn classification(&self) -> Classification {
        Classification {
            priority: self.priority,
            time: self.time,
            severity: self.severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_medium_thirty_minutes_medium() {
        let fallback = Classification::fallback();
        assert_eq!(fallback.priority, Priority::Medium);
        assert_eq!(fallback.time, TimeEstimate::ThirtyMinutes);
        assert_eq!(fallback.severity, Severity::Medium);
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!(" HIGH ".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!("1H".parse::<TimeEstimate>().unwrap(), TimeEstimate::OneHour);
        assert_eq!("Self Care".parse::<Category>().unwrap(), Category::SelfCare);
        assert!("urgent".parse::<Priority>().is_err());
        assert!("45m".parse::<TimeEstimate>().is_err());
    }

    #[test]
    fn task_serializes_with_wire_names() {
        let task = Task::new(
            TaskId(1700000000000),
            NewTask::new("Stretch", "", Category::SelfCare),
            Classification {
                priority: Priority::Low,
                time: TimeEstimate::FifteenMinutes,
                severity: Severity::Critical,
            },
        );

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 1700000000000i64,
                "title": "Stretch",
                "description": "",
                "category": "selfcare",
                "priority": "low",
                "time": "15m",
                "severity": "CRITICAL",
                "completed": false
            })
        );
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(!NewTask::new("   \t", "details", Category::Home).has_title());
        assert!(NewTask::new(" Laundry ", "", Category::Home).has_title());
    }
}
