// Audit trail for event mutations
//
// Every add/update/delete is emitted as a structured tracing record under the
// `eventdesk::audit` target. When a file is configured the same record is also
// appended as a text line. File failures are logged and never propagate.
//
// Decision: The append is a blocking write on the calling thread, made after the
// store lock is released, so file lines keep mutation order

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Kind of mutation being audited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Add,
    Update,
    Delete,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditAction::Add => write!(f, "add"),
            AuditAction::Update => write!(f, "update"),
            AuditAction::Delete => write!(f, "delete"),
        }
    }
}

/// Sink for audit records
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    path: Option<PathBuf>,
}

impl AuditLog {
    /// Audit through tracing only
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Audit through tracing and append lines to `path`
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Record a mutation. `subject` is the event (or `{id}` for deletes).
    pub fn record<T: Serialize>(&self, action: AuditAction, subject: &T) {
        let payload = match serde_json::to_string(subject) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(%action, "Failed to encode audit payload: {}", e);
                return;
            }
        };

        tracing::info!(target: "eventdesk::audit", %action, event = %payload, "event mutated");

        if let Some(path) = &self.path {
            let line = format_line(action, &payload);
            if let Err(e) = append_line(path, &line) {
                tracing::warn!(path = %path.display(), "Failed to write audit log: {}", e);
            }
        }
    }
}

fn format_line(action: AuditAction, payload: &str) -> String {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    format!("{} - Action: {}, Event: {}\n", timestamp, action, payload)
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_display() {
        assert_eq!(AuditAction::Add.to_string(), "add");
        assert_eq!(AuditAction::Update.to_string(), "update");
        assert_eq!(AuditAction::Delete.to_string(), "delete");
    }

    #[test]
    fn test_appends_lines_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.log");
        let log = AuditLog::to_file(&path);

        log.record(AuditAction::Add, &serde_json::json!({"id": 1}));
        log.record(AuditAction::Delete, &serde_json::json!({"id": 1}));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(r#"- Action: add, Event: {"id":1}"#));
        assert!(lines[1].contains("Action: delete"));
    }

    #[test]
    fn test_unwritable_path_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending
        let log = AuditLog::to_file(dir.path());
        log.record(AuditAction::Update, &serde_json::json!({"id": 3}));
    }
}
