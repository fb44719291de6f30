use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Self-documenting header written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- dayglow recovery log: append-only
     Task lists dayglow could not read or save normally end up here.
     If something went missing, copy it back from the entries below.
     View with: dg recovery
     Clear with: dg recovery --clear -->

---
";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Category of a recovery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// A stored value could not be parsed and was ignored
    Read,
    /// A list could not be written to the store
    Write,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Read => write!(f, "read"),
            RecoveryCategory::Write => write!(f, "write"),
        }
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "read" => Some(RecoveryCategory::Read),
            "write" => Some(RecoveryCategory::Write),
            _ => None,
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

/// Return the path to the recovery log file.
pub fn recovery_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".recovery.log")
}

// ---------------------------------------------------------------------------
// Entry formatting
// ---------------------------------------------------------------------------

impl RecoveryEntry {
    /// Format this entry as a markdown block for the recovery log.
    fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "## {} {}: {}\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        ));
        out.push('\n');

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        // Body as fenced code block
        if !self.body.is_empty() {
            let fence = fence_for(&self.body);
            out.push('\n');
            out.push_str(&format!("{}text\n", fence));
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&fence);
            out.push('\n');
        }

        out.push('\n');
        out.push_str("---\n");
        out
    }

    /// Format as human-readable raw markdown for display.
    pub fn to_display_markdown(&self) -> String {
        self.to_markdown()
    }

    /// Serialize to JSON value for `dg recovery --json`.
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append a recovery entry to the log. Errors are swallowed and logged.
pub fn log_recovery(data_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = log_recovery_inner(data_dir, entry) {
        log::warn!("could not write to recovery log: {}", e);
    }
}

fn log_recovery_inner(data_dir: &Path, entry: RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(data_dir);
    let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }

    file.write_all(entry.to_markdown().as_bytes())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read recovery entries from the log file, most recent first.
pub fn read_recovery_entries(data_dir: &Path, limit: Option<usize>) -> Vec<RecoveryEntry> {
    let path = recovery_log_path(data_dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);

    // Entries are parsed oldest-first
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries = entries.into_iter().skip(skip).collect();
    }

    entries.reverse();
    entries
}

/// Drop every entry, leaving only the header. Returns the number removed.
pub fn clear_recovery(data_dir: &Path) -> io::Result<usize> {
    let path = recovery_log_path(data_dir);
    if !path.exists() {
        return Ok(0);
    }
    let content = std::fs::read_to_string(&path)?;
    let count = parse_entries(&content).len();
    std::fs::write(&path, FILE_HEADER)?;
    Ok(count)
}

/// A backtick fence longer than any backtick run in `body`
fn fence_for(body: &str) -> String {
    let longest = body
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

/// Parse all entries from the log content string.
fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some(header) = line.strip_prefix("## ") else {
            continue;
        };
        let Some((timestamp, category, description)) = parse_entry_header(header) else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body = String::new();
        let mut fence: Option<&str> = None;

        for line in lines.by_ref() {
            if let Some(open) = fence {
                if line == open {
                    fence = None;
                } else {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(line);
                }
                continue;
            }

            if line == "---" {
                break;
            }

            if line.starts_with("```") {
                let ticks = line.len() - line.trim_start_matches('`').len();
                fence = Some(&line[..ticks]);
                continue;
            }

            let trimmed = line.trim();
            if let Some((key, value)) = trimmed.split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(RecoveryEntry {
            timestamp,
            category,
            description,
            fields,
            body,
        });
    }

    entries
}

/// Parse an entry header: `<timestamp> <category>: <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (timestamp_str, rest) = header.split_once(' ')?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .ok()?
        .with_timezone(&Utc);

    let (category_str, description) = rest.split_once(": ")?;
    let category = RecoveryCategory::parse_category(category_str)?;

    Some((timestamp, category, description.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn entry(category: RecoveryCategory, body: &str) -> RecoveryEntry {
        RecoveryEntry {
            timestamp: Utc.with_ymd_and_hms(2025, 5, 14, 10, 0, 0).unwrap(),
            category,
            description: "unreadable task list".to_string(),
            fields: vec![("Key".to_string(), "todos".to_string())],
            body: body.to_string(),
        }
    }

    #[test]
    fn log_then_read() {
        let dir = TempDir::new().unwrap();
        log_recovery(dir.path(), entry(RecoveryCategory::Read, "{not json"));
        log_recovery(dir.path(), entry(RecoveryCategory::Write, "[]"));

        let content = std::fs::read_to_string(recovery_log_path(dir.path())).unwrap();
        assert!(content.starts_with("<!-- dayglow recovery log"));
        assert_eq!(content.matches("<!--").count(), 1);

        let entries = read_recovery_entries(dir.path(), None);
        assert_eq!(entries.len(), 2);
        // Most recent first
        assert_eq!(entries[0].category, RecoveryCategory::Write);
        assert_eq!(entries[1].category, RecoveryCategory::Read);
        assert_eq!(entries[1].body, "{not json");
        assert_eq!(
            entries[1].fields,
            vec![("Key".to_string(), "todos".to_string())]
        );
        assert_eq!(entries[1].description, "unreadable task list");
    }

    #[test]
    fn body_with_separator_line_survives() {
        let dir = TempDir::new().unwrap();
        log_recovery(dir.path(), entry(RecoveryCategory::Read, "a\n---\nb"));
        let entries = read_recovery_entries(dir.path(), None);
        assert_eq!(entries[0].body, "a\n---\nb");
    }

    #[test]
    fn body_with_backtick_fences_survives() {
        let dir = TempDir::new().unwrap();
        let body = "before\n```\nmiddle\n````\nafter";
        log_recovery(dir.path(), entry(RecoveryCategory::Write, body));
        let entries = read_recovery_entries(dir.path(), None);
        assert_eq!(entries[0].body, body);
    }

    #[test]
    fn fence_outgrows_body() {
        assert_eq!(fence_for("plain"), "```");
        assert_eq!(fence_for("a ``` b"), "````");
        assert_eq!(fence_for("`````"), "``````");
    }

    #[test]
    fn limit_keeps_most_recent() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            log_recovery(dir.path(), entry(RecoveryCategory::Write, &i.to_string()));
        }
        let entries = read_recovery_entries(dir.path(), Some(2));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].body, "4");
        assert_eq!(entries[1].body, "3");
    }

    #[test]
    fn missing_log_reads_empty() {
        let dir = TempDir::new().unwrap();
        assert!(read_recovery_entries(dir.path(), None).is_empty());
        assert_eq!(clear_recovery(dir.path()).unwrap(), 0);
    }

    #[test]
    fn clear_removes_entries() {
        let dir = TempDir::new().unwrap();
        log_recovery(dir.path(), entry(RecoveryCategory::Read, "x"));
        log_recovery(dir.path(), entry(RecoveryCategory::Read, "y"));
        assert_eq!(clear_recovery(dir.path()).unwrap(), 2);
        assert!(read_recovery_entries(dir.path(), None).is_empty());
    }

    #[test]
    fn json_shape() {
        let json = entry(RecoveryCategory::Write, "[]").to_json();
        assert_eq!(json["category"], "write");
        assert_eq!(json["timestamp"], "2025-05-14T10:00:00Z");
        assert_eq!(json["fields"]["Key"], "todos");
    }
}
