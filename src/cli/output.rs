use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::task::{Filter, Task, TaskCounts};
use crate::ops::theme_clock::ClockSample;

/// Shown when there are no tasks at all
pub const EMPTY_TITLE: &str = "Your todo list is empty";
pub const EMPTY_HINT: &str = "Add a new task to get started";

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: u64,
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub filter: Filter,
    pub counts: TaskCounts,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ClockJson {
    pub time: String,
    pub date: String,
    pub greeting: String,
    pub is_night: bool,
    pub is_daytime: bool,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.0,
        text: task.text.clone(),
        description: task.description.clone(),
        completed: task.completed,
        created_at: task.created_at,
        updated_at: task.updated_at,
    }
}

pub fn clock_to_json(sample: &ClockSample) -> ClockJson {
    ClockJson {
        time: sample.time_label(),
        date: sample.date_label(),
        greeting: sample.greeting().to_string(),
        is_night: sample.is_night,
        is_daytime: sample.is_daytime(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn checkbox(task: &Task) -> char {
    if task.completed { 'x' } else { ' ' }
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    let desc = if task.description.is_empty() {
        String::new()
    } else {
        format!(" ({})", task.description)
    };
    format!("[{}] {} {}{}", checkbox(task), task.id, task.text, desc)
}

/// One line per visible task, then a remaining-count footer. An empty list
/// gets the empty-state message instead.
pub fn format_listing<'a>(
    tasks: impl Iterator<Item = &'a Task>,
    filter: Filter,
    counts: TaskCounts,
) -> Vec<String> {
    if counts.total == 0 {
        return vec![EMPTY_TITLE.to_string(), EMPTY_HINT.to_string()];
    }

    let mut lines: Vec<String> = tasks.map(format_task_line).collect();
    if lines.is_empty() {
        lines.push(format!("No {} tasks", filter.label()));
    }
    lines.push(String::new());
    lines.push(format_counts(counts));
    lines
}

/// `2 of 3 remaining`
pub fn format_counts(counts: TaskCounts) -> String {
    format!("{} of {} remaining", counts.remaining, counts.total)
}

/// Clock summary: time, date, greeting
pub fn format_clock(sample: &ClockSample) -> Vec<String> {
    let glyph = if sample.is_night { "\u{263E}" } else { "\u{2600}" };
    vec![
        sample.time_label(),
        sample.date_label(),
        format!("{} {}", glyph, sample.greeting()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskId;
    use chrono::{NaiveDate, TimeZone};
    use insta::assert_snapshot;

    fn task(id: u64, text: &str, desc: &str, done: bool) -> Task {
        let mut t = Task::new(
            TaskId(id),
            text,
            desc,
            Utc.with_ymd_and_hms(2025, 5, 14, 9, 30, 0).unwrap(),
        );
        t.completed = done;
        t
    }

    #[test]
    fn task_line_open() {
        assert_snapshot!(format_task_line(&task(3, "Buy milk", "2%", false)), @"[ ] 3 Buy milk (2%)");
    }

    #[test]
    fn task_line_done_without_description() {
        assert_snapshot!(format_task_line(&task(4, "Walk the dog", "", true)), @"[x] 4 Walk the dog");
    }

    #[test]
    fn listing_empty_state() {
        let lines = format_listing(std::iter::empty(), Filter::All, TaskCounts::default());
        assert_eq!(lines, vec![EMPTY_TITLE, EMPTY_HINT]);
    }

    #[test]
    fn listing_with_filter_miss() {
        let tasks = [task(1, "a", "", false)];
        let counts = TaskCounts::of(&tasks);
        let lines = format_listing(
            tasks.iter().filter(|t| Filter::Completed.matches(t)),
            Filter::Completed,
            counts,
        );
        assert_eq!(lines, vec!["No done tasks", "", "1 of 1 remaining"]);
    }

    #[test]
    fn listing_with_tasks() {
        let tasks = [task(2, "b", "", true), task(1, "a", "note", false)];
        let lines = format_listing(tasks.iter(), Filter::All, TaskCounts::of(&tasks));
        assert_eq!(
            lines,
            vec!["[x] 2 b", "[ ] 1 a (note)", "", "1 of 2 remaining"]
        );
    }

    #[test]
    fn json_skips_empty_fields() {
        let json = serde_json::to_value(task_to_json(&task(5, "x", "", false))).unwrap();
        assert_eq!(json["id"], 5);
        assert!(json.get("description").is_none());
        assert!(json.get("updated_at").is_none());
    }

    #[test]
    fn clock_lines() {
        let at = NaiveDate::from_ymd_opt(2025, 5, 14)
            .unwrap()
            .and_hms_opt(20, 15, 0)
            .unwrap();
        let sample = ClockSample::at(at);
        assert_eq!(
            format_clock(&sample),
            vec![
                "08:15:00 PM".to_string(),
                "Wednesday, May 14, 2025".to_string(),
                "\u{263E} Have a good night".to_string(),
            ]
        );
        let json = clock_to_json(&sample);
        assert!(json.is_night);
        assert!(!json.is_daytime);
    }
}
