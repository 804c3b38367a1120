use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use super::{NewUser, User, UserChanges, UserPage, UserProfile, UserRepository};
use crate::error::{AppError, DatabaseError};

/// Map-backed repository for tests and database-less runs
#[derive(Default)]
pub struct InMemoryUserRepository {
    inner: RwLock<Users>,
}

#[derive(Default)]
struct Users {
    next_id: i32,
    rows: BTreeMap<i32, User>,
}

impl Users {
    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.rows
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_email() -> AppError {
    AppError::Database(DatabaseError::UniqueConstraintViolation(
        "Email already registered".to_string(),
    ))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let users = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.rows.get(&id).cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<UserPage, AppError> {
        let users = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let page = users
            .rows
            .values()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .map(UserProfile::from)
            .collect();

        Ok(UserPage {
            users: page,
            total_count: users.rows.len() as i64,
        })
    }

    async fn create(&self, user: NewUser) -> Result<i32, AppError> {
        let mut users = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if users.email_taken(&user.email, None) {
            return Err(duplicate_email());
        }

        users.next_id += 1;
        let id = users.next_id;
        users.rows.insert(
            id,
            User {
                id,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                password_hash: user.password_hash,
            },
        );
        Ok(id)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<bool, AppError> {
        let mut users = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(email) = &changes.email {
            if users.email_taken(email, Some(id)) {
                return Err(duplicate_email());
            }
        }

        match users.rows.get_mut(&id) {
            Some(user) => {
                changes.apply_to(user);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut users = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        Ok(users.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryUserRepository::new();
        let id = repo.create(new_user("ada@example.com")).await.unwrap();

        let by_email = repo.find_by_email("ada@example.com").await.unwrap().unwrap();
        let by_id = repo.find_by_id(id).await.unwrap().unwrap();

        assert_eq!(by_email.id, id);
        assert_eq!(by_id.email, "ada@example.com");
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("ada@example.com")).await.unwrap();

        let result = repo.create(new_user("ada@example.com")).await;

        assert!(matches!(
            result,
            Err(AppError::Database(DatabaseError::UniqueConstraintViolation(_)))
        ));
    }

    #[tokio::test]
    async fn test_list_pages_in_id_order() {
        let repo = InMemoryUserRepository::new();
        for i in 0..5 {
            repo.create(new_user(&format!("user{}@example.com", i))).await.unwrap();
        }

        let page = repo.list(2, 2).await.unwrap();

        assert_eq!(page.total_count, 5);
        assert_eq!(page.users.len(), 2);
        assert_eq!(page.users[0].id, 3);
        assert_eq!(page.users[1].id, 4);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = InMemoryUserRepository::new();
        let id = repo.create(new_user("ada@example.com")).await.unwrap();

        let changes = UserChanges {
            last_name: Some("Byron".to_string()),
            ..UserChanges::default()
        };
        assert!(repo.update(id, changes).await.unwrap());
        assert_eq!(repo.find_by_id(id).await.unwrap().unwrap().last_name, "Byron");

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
        assert!(!repo.update(id, UserChanges::default()).await.unwrap());
    }
}
