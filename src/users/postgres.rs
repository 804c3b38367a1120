use async_trait::async_trait;
use sqlx::PgPool;

use super::{NewUser, User, UserChanges, UserPage, UserProfile, UserRepository};
use crate::error::AppError;

type UserRow = (i32, String, String, String, String);

fn into_user((id, first_name, last_name, email, password_hash): UserRow) -> User {
    User {
        id,
        first_name,
        last_name,
        email,
        password_hash,
    }
}

/// Postgres-backed repository over the `users` table
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, first_name, last_name, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(into_user))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, first_name, last_name, email, password_hash FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(into_user))
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<UserPage, AppError> {
        let rows = sqlx::query_as::<_, (i32, String, String, String)>(
            r#"
            SELECT id, first_name, last_name, email
            FROM users
            ORDER BY id
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let total_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let users = rows
            .into_iter()
            .map(|(id, first_name, last_name, email)| UserProfile {
                id,
                first_name,
                last_name,
                email,
            })
            .collect();

        Ok(UserPage { users, total_count })
    }

    async fn create(&self, user: NewUser) -> Result<i32, AppError> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                password_hash = COALESCE($5, password_hash)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.email)
        .bind(changes.password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
