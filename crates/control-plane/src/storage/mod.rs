// Storage layer for the EventDesk control-plane
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
//
// Users are the only relational data; events live in eventdesk-core's
// EventStore and are persisted to a JSON file instead.

pub mod backend;
pub mod error;
pub mod memory;
pub mod models;
pub mod password;
pub mod repositories;

pub use backend::StorageBackend;
pub use error::StorageError;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::Database;
