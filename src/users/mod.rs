/// User records
///
/// The auth core only reads users (lookup by email, by ID); the admin routes
/// also create, list, update and delete them. Storage sits behind
/// `UserRepository` so the service runs against Postgres in production and an
/// in-memory map in tests.

mod memory;
mod postgres;

pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppError;

/// A stored user, password hash included
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// The public face of a user; never carries the hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }
    }
}

/// Fields for a new user; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    fn apply_to(self, user: &mut User) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
    }
}

/// One page of users plus the total row count
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<UserProfile>,
    pub total_count: i64,
}

/// User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError>;

    /// Users ordered by ID
    async fn list(&self, offset: i64, limit: i64) -> Result<UserPage, AppError>;

    /// Insert and return the new user's ID
    async fn create(&self, user: NewUser) -> Result<i32, AppError>;

    /// Returns `false` if no user has this ID
    async fn update(&self, id: i32, changes: UserChanges) -> Result<bool, AppError>;

    /// Returns `false` if no user has this ID
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}
