// EventDesk Core
//
// This crate provides the calendar event domain used by the EventDesk server.
//
// Key design decisions:
// - The store is an explicitly owned object, shared by reference (no globals)
// - Ids come from a store-owned monotonic counter and are never reused
// - Every stored event satisfies start < end and has a non-empty title
// - Persistence is a whole-file JSON snapshot, written atomically
// - Mutations leave an audit trail (tracing, plus an optional append-only file)

pub mod audit;
pub mod config;
pub mod error;
pub mod event;
pub mod persistence;
pub mod store;

// Re-exports for convenience
pub use audit::{AuditAction, AuditLog};
pub use config::EventStoreConfig;
pub use error::{EventStoreError, Result};
pub use event::{validate_event, Event, EventInput, EventPatch};
pub use store::{EventStore, SortOrder};
