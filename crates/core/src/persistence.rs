// JSON file persistence for the event store
// Decision: Whole-file snapshot, pretty-printed, replaced via temp file + rename
// Decision: A missing file on load means "no events yet", not an error
// Decision: Saves are serialized by an async mutex held across the write and rename

use std::ffi::{OsStr, OsString};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::{EventStoreError, Result};
use crate::event::Event;
use crate::store::EventStore;

impl EventStore {
    /// Save to the configured events file
    pub async fn save_to_file(&self) -> Result<()> {
        let path = self
            .events_file()
            .ok_or(EventStoreError::NoFileConfigured)?
            .to_path_buf();
        self.save_to(&path).await
    }

    /// Load from the configured events file, returning how many events were loaded
    pub async fn load_from_file(&self) -> Result<usize> {
        let path = self
            .events_file()
            .ok_or(EventStoreError::NoFileConfigured)?
            .to_path_buf();
        self.load_from(&path).await
    }

    /// Write a snapshot of the whole collection to `path`
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        let _guard = self.save_lock.lock().await;
        // Snapshot under the lock so the last writer always has the newest state
        let events = self.list();
        let json = serde_json::to_vec_pretty(&events)?;

        let tmp_path = temp_path_for(path);
        if let Err(e) = write_and_replace(&tmp_path, path, &json).await {
            // The temp file may or may not exist, depending on where the write stopped
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        tracing::info!(path = %path.display(), count = events.len(), "Events saved to file");
        Ok(())
    }

    /// Replace the collection with the snapshot at `path`
    pub async fn load_from(&self, path: &Path) -> Result<usize> {
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    path = %path.display(),
                    "No saved events file found, starting with an empty list"
                );
                self.replace_all(Vec::new())?;
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };

        let events: Vec<Event> = serde_json::from_slice(&data)?;
        let count = events.len();
        self.replace_all(events)?;

        tracing::info!(path = %path.display(), count, "Events loaded from file");
        Ok(count)
    }
}

async fn write_and_replace(tmp_path: &Path, path: &Path, json: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(tmp_path).await?;
    file.write_all(json).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(tmp_path, path).await
}

/// Sibling temp file so the rename stays on one filesystem
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or(OsStr::new("events.json")));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventStoreConfig;
    use crate::event::EventInput;
    use chrono::{Duration, TimeZone, Utc};

    fn sample_input(title: &str, hour: u32) -> EventInput {
        let start = Utc.with_ymd_and_hms(2024, 5, 20, hour, 0, 0).unwrap();
        EventInput::new(title, start, start + Duration::minutes(45))
    }

    #[tokio::test]
    async fn test_save_then_load_on_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");

        let store = EventStore::new();
        store
            .add(sample_input("Project Meeting", 9).with_description("Milestones"))
            .unwrap();
        store.add(sample_input("Retro", 14)).unwrap();
        store.save_to(&path).await.unwrap();

        let fresh = EventStore::new();
        let count = fresh.load_from(&path).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(fresh.list(), store.list());
    }

    #[tokio::test]
    async fn test_saved_file_is_pretty_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");

        let store = EventStore::new();
        store.add(sample_input("Standup", 9)).unwrap();
        store.save_to(&path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["title"], "Standup");

        // Temp file does not linger after the rename
        assert!(!temp_path_for(&path).exists());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");

        let store = EventStore::new();
        let first = store.add(sample_input("One", 9)).unwrap();
        store.add(sample_input("Two", 10)).unwrap();
        store.save_to(&path).await.unwrap();

        store.delete(first.id);
        store.save_to(&path).await.unwrap();

        let fresh = EventStore::new();
        assert_eq!(fresh.load_from(&path).await.unwrap(), 1);
        assert_eq!(fresh.list()[0].title, "Two");
    }

    #[tokio::test]
    async fn test_load_missing_file_gives_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::new();
        store.add(sample_input("Stale", 9)).unwrap();

        let count = store
            .load_from(&dir.path().join("does-not-exist.json"))
            .await
            .unwrap();

        assert_eq!(count, 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = EventStore::new();
        let err = store.load_from(&path).await.unwrap_err();
        assert!(matches!(err, EventStoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_load_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::new();
        let err = store.load_from(dir.path()).await.unwrap_err();
        assert!(matches!(err, EventStoreError::Io(_)));
    }

    #[tokio::test]
    async fn test_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = EventStoreConfig {
            events_file: Some(dir.path().join("events.json")),
            audit_log: None,
        };

        let store = EventStore::from_config(&config);
        store.add(sample_input("Configured", 9)).unwrap();
        store.save_to_file().await.unwrap();

        let reloaded = EventStore::from_config(&config);
        assert_eq!(reloaded.load_from_file().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_no_file_configured() {
        let store = EventStore::new();
        assert!(matches!(
            store.save_to_file().await,
            Err(EventStoreError::NoFileConfigured)
        ));
        assert!(matches!(
            store.load_from_file().await,
            Err(EventStoreError::NoFileConfigured)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        let store = std::sync::Arc::new(EventStore::new());

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            let path = path.clone();
            handles.push(tokio::spawn(async move {
                store.add(sample_input(&format!("Event {}", i), 9)).unwrap();
                store.save_to(&path).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let fresh = EventStore::new();
        assert_eq!(fresh.load_from(&path).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_failed_save_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory where the snapshot should go makes the final step fail
        let path = dir.path().join("events.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let store = EventStore::new();
        store.add(sample_input("Unsaved", 9)).unwrap();
        let err = store.save_to(&path).await.unwrap_err();

        assert!(matches!(err, EventStoreError::Io(_)));
        assert!(!temp_path_for(&path).exists());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let tmp = temp_path_for(Path::new("/data/events.json"));
        assert_eq!(tmp, PathBuf::from("/data/.events.json.tmp"));
    }
}
