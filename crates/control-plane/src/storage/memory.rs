// In-memory storage implementation for dev mode
// Decision: Use parking_lot for thread-safe access
// Decision: Mirror the PostgreSQL unique constraints so dev mode reports the same duplicates
//
// This implementation provides the same API as the PostgreSQL repository,
// backed by a HashMap, allowing the control-plane to run without a database.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

use super::error::{Result, StorageError, EMAIL_CONSTRAINT, USERNAME_CONSTRAINT};
use super::models::{CreateUserRow, UserRow};

#[derive(Default)]
struct UserTable {
    rows: HashMap<i64, UserRow>,
    next_id: i64,
}

/// In-memory database for dev mode
/// All data is stored in memory and lost on restart
#[derive(Default)]
pub struct InMemoryDatabase {
    users: RwLock<UserTable>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let mut table = self.users.write();

        if table.rows.values().any(|u| u.username == input.username) {
            return Err(StorageError::UniqueViolation(USERNAME_CONSTRAINT.to_string()));
        }
        if let Some(email) = &input.email {
            if table.rows.values().any(|u| u.email.as_ref() == Some(email)) {
                return Err(StorageError::UniqueViolation(EMAIL_CONSTRAINT.to_string()));
            }
        }

        table.next_id += 1;
        let id = table.next_id;
        let now = Self::now();
        let row = UserRow {
            id,
            username: input.username,
            password_hash: input.password_hash,
            email: input.email,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .rows
            .values()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

}
