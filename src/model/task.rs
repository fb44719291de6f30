use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a task, unique within a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

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

/// A single to-do item
///
/// Field names serialize in camelCase (`createdAt`, `updatedAt`) so the
/// persisted list stays readable by other tools that share the same blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredTask")]
pub struct Task {
    pub id: TaskId,
    /// Task text, always trimmed and non-empty
    pub text: String,
    /// Optional longer description, trimmed (may be empty)
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    /// Set once when the task is created
    pub created_at: DateTime<Utc>,
    /// Set each time an edit is saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A task as found in storage. Older lists carry only `id`, `text` and
/// `completed`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTask {
    id: TaskId,
    text: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<StoredTask> for Task {
    /// Trims text and description. A missing `createdAt` is recovered from
    /// the millisecond id, falling back to the Unix epoch.
    fn from(stored: StoredTask) -> Self {
        let created_at = stored.created_at.unwrap_or_else(|| {
            i64::try_from(stored.id.0)
                .ok()
                .and_then(DateTime::from_timestamp_millis)
                .unwrap_or(DateTime::UNIX_EPOCH)
        });
        Task {
            id: stored.id,
            text: stored.text.trim().to_string(),
            description: stored.description.trim().to_string(),
            completed: stored.completed,
            created_at,
            updated_at: stored.updated_at,
        }
    }
}

impl Task {
    /// Create a new, not yet completed task. Text and description are trimmed.
    pub fn new(id: TaskId, text: &str, description: &str, now: DateTime<Utc>) -> Self {
        Task {
            id,
            text: text.trim().to_string(),
            description: description.trim().to_string(),
            completed: false,
            created_at: now,
            updated_at: None,
        }
    }

    /// True if the record could have been produced by the store: text is
    /// non-empty once trimmed.
    pub fn is_well_formed(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Which tasks a view shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    /// All → Active → Completed → All
    pub fn next(self) -> Filter {
        match self {
            Filter::All => Filter::Active,
            Filter::Active => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "done",
        }
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Filter::All),
            "active" | "todo" => Ok(Filter::Active),
            "done" | "completed" => Ok(Filter::Completed),
            other => Err(format!(
                "invalid filter: {} (expected all, active, done)",
                other
            )),
        }
    }
}

/// Counts over a task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub remaining: usize,
    pub completed: usize,
}

impl TaskCounts {
    pub fn of(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        TaskCounts {
            total: tasks.len(),
            remaining: tasks.len() - completed,
            completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn new_trims_text_and_description() {
        let task = Task::new(TaskId(1), "  Buy milk ", " 2% ", ts());
        assert_eq!(task.text, "Buy milk");
        assert_eq!(task.description, "2%");
        assert!(!task.completed);
        assert_eq!(task.created_at, ts());
        assert!(task.updated_at.is_none());
    }

    #[test]
    fn serializes_camel_case() {
        let task = Task::new(TaskId(42), "Buy milk", "", ts());
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["createdAt"], "2025-05-14T09:30:00Z");
        assert!(json.get("updatedAt").is_none());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn minimal_record_gets_defaults() {
        let task: Task = serde_json::from_str(
            r#"{"id":7,"text":"Walk","createdAt":"2025-05-14T09:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(task.description, "");
        assert!(!task.completed);
        assert!(task.updated_at.is_none());
    }

    #[test]
    fn legacy_record_without_timestamp() {
        let task: Task =
            serde_json::from_str(r#"{"id":1700000000000,"text":"Buy milk","completed":true}"#)
                .unwrap();
        assert!(task.completed);
        assert_eq!(task.description, "");
        assert_eq!(
            task.created_at,
            Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap()
        );
    }

    #[test]
    fn out_of_range_id_falls_back_to_epoch() {
        let task: Task =
            serde_json::from_str(r#"{"id":18446744073709551615,"text":"x"}"#).unwrap();
        assert_eq!(task.created_at, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn loaded_text_is_trimmed() {
        let task: Task = serde_json::from_str(
            r#"{"id":3,"text":"  a ","description":" note\n","createdAt":"2025-05-14T09:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(task.text, "a");
        assert_eq!(task.description, "note");
    }

    #[test]
    fn filter_matches_and_cycles() {
        let mut task = Task::new(TaskId(1), "x", "", ts());
        assert!(Filter::All.matches(&task));
        assert!(Filter::Active.matches(&task));
        assert!(!Filter::Completed.matches(&task));
        task.completed = true;
        assert!(Filter::Completed.matches(&task));
        assert_eq!(Filter::All.next().next().next(), Filter::All);
    }

    #[test]
    fn filter_from_str() {
        assert_eq!("done".parse::<Filter>(), Ok(Filter::Completed));
        assert_eq!("active".parse::<Filter>(), Ok(Filter::Active));
        assert!("nope".parse::<Filter>().is_err());
    }

    #[test]
    fn counts() {
        let mut a = Task::new(TaskId(1), "a", "", ts());
        let b = Task::new(TaskId(2), "b", "", ts());
        a.completed = true;
        let counts = TaskCounts::of(&[a, b]);
        assert_eq!(
            counts,
            TaskCounts {
                total: 2,
                remaining: 1,
                completed: 1
            }
        );
    }

    #[test]
    fn task_id_parses_with_whitespace() {
        assert_eq!(" 17 ".parse::<TaskId>(), Ok(TaskId(17)));
        assert!("abc".parse::<TaskId>().is_err());
    }
}
