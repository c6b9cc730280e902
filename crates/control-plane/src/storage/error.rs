// Storage error types
// Decision: Unique constraint violations get their own variant so the auth
// layer can report duplicates without inspecting driver errors

use thiserror::Error;

/// Unique constraint on users.username
pub const USERNAME_CONSTRAINT: &str = "users_username_key";
/// Unique constraint on users.email
pub const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Errors that can occur in the storage layer
#[derive(Debug, Error)]
pub enum StorageError {
    /// A unique constraint rejected the write (constraint name)
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Database driver error
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Schema migration failed at startup
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StorageError::UniqueViolation(constraint);
            }
        }
        StorageError::Database(err)
    }
}

impl StorageError {
    /// Name of the violated constraint, if this is a unique violation
    pub fn constraint(&self) -> Option<&str> {
        match self {
            StorageError::UniqueViolation(name) => Some(name),
            _ => None,
        }
    }
}

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
