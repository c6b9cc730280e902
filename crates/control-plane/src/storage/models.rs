// Database row types

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row in the `users` table
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    /// Argon2id PHC string (column `password`)
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a user
#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
}
