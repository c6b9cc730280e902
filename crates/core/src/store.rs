// In-memory event store
// Decision: Use parking_lot for thread-safe access, never held across .await
// Decision: Ids come from a counter owned by the store, so deleted ids are never handed out again
//
// The collection keeps insertion order. Sorting and searching return new
// vectors and leave the stored order alone.

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::audit::{AuditAction, AuditLog};
use crate::config::EventStoreConfig;
use crate::error::{EventStoreError, Result};
use crate::event::{Event, EventInput, EventPatch};

/// Direction for sorted views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    #[serde(alias = "ascending")]
    Asc,
    #[serde(alias = "descending")]
    Desc,
}

impl SortOrder {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortOrder::Asc
    }
}

#[derive(Debug)]
struct StoreState {
    events: Vec<Event>,
    next_id: u64,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
        }
    }
}

/// Calendar event store
///
/// Shared as `Arc<EventStore>`; all methods take `&self`.
#[derive(Debug, Default)]
pub struct EventStore {
    state: RwLock<StoreState>,
    events_file: Option<PathBuf>,
    audit: AuditLog,
    /// Serializes snapshot writes so they never share a temp file
    pub(crate) save_lock: tokio::sync::Mutex<()>,
}

impl EventStore {
    /// Create an empty store that never touches the filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store wired to the configured files.
    /// Call [`EventStore::load_from_file`] to pick up a previous snapshot.
    pub fn from_config(config: &EventStoreConfig) -> Self {
        let audit = match &config.audit_log {
            Some(path) => AuditLog::to_file(path),
            None => AuditLog::disabled(),
        };
        Self {
            state: RwLock::new(StoreState::default()),
            events_file: config.events_file.clone(),
            audit,
            save_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Backing snapshot file, if any
    pub fn events_file(&self) -> Option<&Path> {
        self.events_file.as_deref()
    }

    pub fn len(&self) -> usize {
        self.state.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().events.is_empty()
    }

    // ============================================
    // Mutations
    // ============================================

    /// Add a new event, assigning the next id
    pub fn add(&self, input: EventInput) -> Result<Event> {
        if let Err(e) = input.validate() {
            tracing::debug!(title = %input.title, "Rejected event: {}", e);
            return Err(e);
        }

        let event = {
            let mut state = self.state.write();
            let id = state.next_id;
            state.next_id = id
                .checked_add(1)
                .ok_or_else(|| EventStoreError::invalid("event id space exhausted"))?;
            let event = Event {
                id,
                title: input.title,
                start: input.start,
                end: input.end,
                description: input.description,
                created_at: Utc::now(),
            };
            state.events.push(event.clone());
            event
        };

        self.audit.record(AuditAction::Add, &event);
        Ok(event)
    }

    /// Merge `patch` into the event with `id`.
    /// Returns `Ok(None)` when no such event exists. The merged event must be
    /// valid, otherwise the stored event is left unchanged.
    pub fn update(&self, id: u64, patch: EventPatch) -> Result<Option<Event>> {
        let updated = {
            let mut state = self.state.write();
            let Some(existing) = state.events.iter_mut().find(|e| e.id == id) else {
                return Ok(None);
            };
            let merged = existing.merged(&patch);
            if let Err(e) = merged.validate() {
                tracing::debug!(id, "Rejected event update: {}", e);
                return Err(e);
            }
            *existing = merged.clone();
            merged
        };

        self.audit.record(AuditAction::Update, &updated);
        Ok(Some(updated))
    }

    /// Remove the event with `id`. Returns whether anything was removed.
    pub fn delete(&self, id: u64) -> bool {
        let removed = {
            let mut state = self.state.write();
            let before = state.events.len();
            state.events.retain(|e| e.id != id);
            before != state.events.len()
        };

        if removed {
            self.audit
                .record(AuditAction::Delete, &serde_json::json!({ "id": id }));
        }
        removed
    }

    /// Swap in a whole collection (used when loading a snapshot).
    /// The id counter never moves backwards.
    pub fn replace_all(&self, events: Vec<Event>) -> Result<()> {
        let mut seen = HashSet::with_capacity(events.len());
        for event in &events {
            if !seen.insert(event.id) {
                return Err(EventStoreError::invalid(format!(
                    "duplicate event id {}",
                    event.id
                )));
            }
            event.validate().map_err(|e| {
                EventStoreError::invalid(format!("event {}: {}", event.id, e))
            })?;
        }

        let max_id = events.iter().map(|e| e.id).max().unwrap_or(0);
        let resume_at = max_id
            .checked_add(1)
            .ok_or_else(|| EventStoreError::invalid("event id space exhausted"))?;
        let mut state = self.state.write();
        state.next_id = state.next_id.max(resume_at);
        state.events = events;
        Ok(())
    }

    // ============================================
    // Queries
    // ============================================

    pub fn get(&self, id: u64) -> Option<Event> {
        self.state.read().events.iter().find(|e| e.id == id).cloned()
    }

    /// All events in insertion order
    pub fn list(&self) -> Vec<Event> {
        self.state.read().events.clone()
    }

    /// Case-insensitive substring match on the title
    pub fn search_by_title(&self, query: &str) -> Vec<Event> {
        let pattern = query.to_lowercase();
        self.state
            .read()
            .events
            .iter()
            .filter(|e| e.title.to_lowercase().contains(&pattern))
            .cloned()
            .collect()
    }

    pub fn sorted_by_start(&self, order: SortOrder) -> Vec<Event> {
        let mut events = self.list();
        sort_events(&mut events, order, |e| e.start);
        events
    }

    pub fn sorted_by_creation(&self, order: SortOrder) -> Vec<Event> {
        let mut events = self.list();
        sort_events(&mut events, order, |e| e.created_at);
        events
    }
}

/// Stable sort so ties keep insertion order in both directions
pub fn sort_events<K: Ord>(events: &mut [Event], order: SortOrder, key: impl Fn(&Event) -> K) {
    match order {
        SortOrder::Asc => events.sort_by(|a, b| key(a).cmp(&key(b))),
        SortOrder::Desc => events.sort_by(|a, b| key(b).cmp(&key(a))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn input(title: &str, start_hour: u32) -> EventInput {
        EventInput::new(title, at(start_hour), at(start_hour) + Duration::hours(1))
    }

    #[test]
    fn test_add_and_get_round_trip() {
        let store = EventStore::new();
        let added = store
            .add(input("Project Meeting", 9).with_description("Discuss project milestones"))
            .unwrap();

        assert_eq!(added.id, 1);
        let fetched = store.get(added.id).unwrap();
        assert_eq!(fetched, added);
        assert_eq!(fetched.title, "Project Meeting");
        assert_eq!(fetched.start, at(9));
        assert_eq!(fetched.end, at(10));
        assert_eq!(
            fetched.description.as_deref(),
            Some("Discuss project milestones")
        );
    }

    #[test]
    fn test_add_invalid_leaves_store_unchanged() {
        let store = EventStore::new();
        store.add(input("Existing", 8)).unwrap();

        let reversed = EventInput::new("Backwards", at(10), at(9));
        let err = store.add(reversed).unwrap_err();
        assert!(err.is_invalid_event());

        let empty = EventInput::new("", at(10), at(11));
        assert!(store.add(empty).is_err());

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let store = EventStore::new();
        let first = store.add(input("A", 8)).unwrap();
        let second = store.add(input("B", 9)).unwrap();

        assert!(store.delete(first.id));
        let third = store.add(input("C", 10)).unwrap();

        assert_eq!(second.id, 2);
        assert_eq!(third.id, 3);
        assert_ne!(third.id, second.id);
    }

    #[test]
    fn test_update_merges_fields() {
        let store = EventStore::new();
        let event = store
            .add(input("Lecture", 9).with_description("Room 101"))
            .unwrap();

        let patch = EventPatch {
            end: Some(at(12)),
            ..Default::default()
        };
        let updated = store.update(event.id, patch).unwrap().unwrap();

        assert_eq!(updated.title, "Lecture");
        assert_eq!(updated.end, at(12));
        assert_eq!(updated.description.as_deref(), Some("Room 101"));
        assert_eq!(store.get(event.id).unwrap(), updated);
    }

    #[test]
    fn test_update_missing_returns_none() {
        let store = EventStore::new();
        let result = store
            .update(
                42,
                EventPatch {
                    title: Some("Ghost".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_update_invalid_keeps_original() {
        let store = EventStore::new();
        let event = store.add(input("Lab", 9)).unwrap();

        let patch = EventPatch {
            start: Some(at(11)),
            ..Default::default()
        };
        assert!(store.update(event.id, patch).is_err());
        assert_eq!(store.get(event.id).unwrap(), event);

        let blank = EventPatch {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(store.update(event.id, blank).is_err());
        assert_eq!(store.get(event.id).unwrap().title, "Lab");
    }

    #[test]
    fn test_delete() {
        let store = EventStore::new();
        let event = store.add(input("Seminar", 9)).unwrap();
        store.add(input("Workshop", 10)).unwrap();

        assert!(!store.delete(999));
        assert_eq!(store.len(), 2);

        assert!(store.delete(event.id));
        assert_eq!(store.len(), 1);
        assert!(store.get(event.id).is_none());
        assert!(!store.delete(event.id));
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let store = EventStore::new();
        store.add(input("Late", 15)).unwrap();
        store.add(input("Early", 8)).unwrap();

        let titles: Vec<String> = store.list().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Late", "Early"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let store = EventStore::new();
        store.add(input("Project Meeting", 9)).unwrap();
        store.add(input("Team lunch", 12)).unwrap();
        store.add(input("PROJECT review", 15)).unwrap();

        let hits = store.search_by_title("project");
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|e| e.title.to_lowercase().contains("project")));

        assert!(store.search_by_title("dentist").is_empty());
        assert_eq!(store.search_by_title("").len(), 3);
    }

    #[test]
    fn test_sort_by_start_does_not_mutate() {
        let store = EventStore::new();
        store.add(input("Noon", 12)).unwrap();
        store.add(input("Morning", 8)).unwrap();
        store.add(input("Evening", 18)).unwrap();

        let asc: Vec<String> = store
            .sorted_by_start(SortOrder::Asc)
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(asc, vec!["Morning", "Noon", "Evening"]);

        let desc: Vec<String> = store
            .sorted_by_start(SortOrder::from_ascending(false))
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(desc, vec!["Evening", "Noon", "Morning"]);

        let stored: Vec<String> = store.list().into_iter().map(|e| e.title).collect();
        assert_eq!(stored, vec!["Noon", "Morning", "Evening"]);
    }

    #[test]
    fn test_sort_by_creation() {
        let store = EventStore::new();
        let base = at(0);
        store
            .replace_all(vec![
                Event {
                    id: 1,
                    title: "Second".to_string(),
                    start: at(9),
                    end: at(10),
                    description: None,
                    created_at: base + Duration::minutes(2),
                },
                Event {
                    id: 2,
                    title: "First".to_string(),
                    start: at(9),
                    end: at(10),
                    description: None,
                    created_at: base + Duration::minutes(1),
                },
            ])
            .unwrap();

        let asc = store.sorted_by_creation(SortOrder::Asc);
        assert_eq!(asc[0].title, "First");
        let desc = store.sorted_by_creation(SortOrder::Desc);
        assert_eq!(desc[0].title, "Second");
    }

    #[test]
    fn test_replace_all_resumes_counter() {
        let store = EventStore::new();
        let event = |id: u64| Event {
            id,
            title: format!("Event {}", id),
            start: at(9),
            end: at(10),
            description: None,
            created_at: at(0),
        };
        store.replace_all(vec![event(4), event(9)]).unwrap();

        let added = store.add(input("Next", 11)).unwrap();
        assert_eq!(added.id, 10);
    }

    #[test]
    fn test_replace_all_rejects_bad_data() {
        let store = EventStore::new();
        let mut bad = Event {
            id: 1,
            title: "Broken".to_string(),
            start: at(10),
            end: at(9),
            description: None,
            created_at: at(0),
        };
        assert!(store.replace_all(vec![bad.clone()]).is_err());

        bad.end = at(11);
        assert!(store.replace_all(vec![bad.clone(), bad]).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_all_rejects_exhausted_id_space() {
        let store = EventStore::new();
        let event = |id| Event {
            id,
            title: "Edge".to_string(),
            start: at(10),
            end: at(11),
            description: None,
            created_at: at(0),
        };

        let err = store
            .replace_all(vec![event(1), event(u64::MAX)])
            .unwrap_err();
        assert!(err.is_invalid_event());
        assert!(err.to_string().contains("event id space exhausted"));
        assert!(store.is_empty());

        store.replace_all(vec![event(u64::MAX - 1)]).unwrap();
        let err = store.add(input("Overflow", 9)).unwrap_err();
        assert!(err.is_invalid_event());
        assert_eq!(store.len(), 1);
        assert!(store.list().iter().all(|e| e.id == u64::MAX - 1));
    }

    #[test]
    fn test_sort_order_from_query_string() {
        let order: SortOrder = serde_json::from_str(r#""desc""#).unwrap();
        assert_eq!(order, SortOrder::Desc);
        let order: SortOrder = serde_json::from_str(r#""ascending""#).unwrap();
        assert!(order.is_ascending());
    }
}
