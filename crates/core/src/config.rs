// Event store configuration loaded from environment variables.
// Decision: Persistence is on by default (events.json in the working directory)
// Decision: An empty EVENTS_FILE disables persistence entirely

use std::path::PathBuf;

/// Default file the store is mirrored to
pub const DEFAULT_EVENTS_FILE: &str = "events.json";

/// Event store configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventStoreConfig {
    /// JSON snapshot file (None disables save/load)
    pub events_file: Option<PathBuf>,
    /// Append-only audit log file (None keeps the audit in tracing only)
    pub audit_log: Option<PathBuf>,
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        Self {
            events_file: Some(PathBuf::from(DEFAULT_EVENTS_FILE)),
            audit_log: None,
        }
    }
}

impl EventStoreConfig {
    /// In-memory only, no files touched
    pub fn ephemeral() -> Self {
        Self {
            events_file: None,
            audit_log: None,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("EVENTS_FILE").ok(),
            std::env::var("EVENTS_AUDIT_LOG").ok(),
        )
    }

    fn from_vars(events_file: Option<String>, audit_log: Option<String>) -> Self {
        let events_file = match events_file {
            Some(path) if path.trim().is_empty() => None,
            Some(path) => Some(PathBuf::from(path.trim())),
            None => Some(PathBuf::from(DEFAULT_EVENTS_FILE)),
        };

        let audit_log = audit_log
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Self {
            events_file,
            audit_log,
        }
    }

    /// Whether the store is mirrored to disk
    pub fn persistence_enabled(&self) -> bool {
        self.events_file.is_some()
    }
}
