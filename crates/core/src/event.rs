// Event domain types
//
// These types represent a calendar event and the payloads used to create
// or modify one. Used by both the store and the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{EventStoreError, Result};

/// A calendar event held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Event {
    /// Sequential identifier assigned by the store.
    pub id: u64,
    /// Human-readable title. Never empty.
    pub title: String,
    /// When the event starts.
    pub start: DateTime<Utc>,
    /// When the event ends. Always after `start`.
    pub end: DateTime<Utc>,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the event was added to the store.
    /// Files written before this field existed load with the Unix epoch.
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

/// Data for a new event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EventInput {
    #[cfg_attr(feature = "openapi", schema(example = "Project Meeting"))]
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "Discuss project milestones"))]
    pub description: Option<String>,
}

/// Partial update for an existing event.
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EventPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

impl EventInput {
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the input, returning the first violated rule.
    pub fn validate(&self) -> Result<()> {
        check_fields(&self.title, self.start, self.end)
    }
}

impl Event {
    /// Check a stored (or about-to-be-stored) event.
    pub fn validate(&self) -> Result<()> {
        check_fields(&self.title, self.start, self.end)
    }

    /// Return a copy with the patch applied (shallow merge).
    pub fn merged(&self, patch: &EventPatch) -> Event {
        let mut updated = self.clone();
        if let Some(title) = &patch.title {
            updated.title = title.clone();
        }
        if let Some(start) = patch.start {
            updated.start = start;
        }
        if let Some(end) = patch.end {
            updated.end = end;
        }
        if let Some(description) = &patch.description {
            updated.description = Some(description.clone());
        }
        updated
    }
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.description.is_none()
    }
}

/// Returns true when the data may be stored as an event.
pub fn validate_event(input: &EventInput) -> bool {
    input.validate().is_ok()
}

fn check_fields(title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if title.trim().is_empty() {
        return Err(EventStoreError::invalid("title must not be empty"));
    }
    if start >= end {
        return Err(EventStoreError::invalid("start must be before end"));
    }
    Ok(())
}
