//! User table operations

use anyhow::Result;
use sqlx::FromRow;

use crate::db::DbEngine;
use crate::models::User;

/// Database row for user table
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
    image: Option<String>,
    created_at: i64,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password: self.password,
            image: self.image,
            created_at: self.created_at,
        }
    }
}

/// User table operations
pub struct UserTable;

impl UserTable {
    /// Get user by ID
    pub async fn get_by_id(db: &DbEngine, id: i64) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, password, image, created_at FROM user WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(db.pool())
        .await?;

        Ok(row.map(|r| r.into_user()))
    }

    /// Get user by username
    pub async fn get_by_username(db: &DbEngine, username: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, password, image, created_at FROM user WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(db.pool())
        .await?;

        Ok(row.map(|r| r.into_user()))
    }

    /// Insert a user, returning its id
    pub async fn insert(db: &DbEngine, user: &User) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO user (username, password, image, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.image)
        .bind(user.created_at)
        .execute(db.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Check whether a username is taken
    pub async fn exists(db: &DbEngine, username: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user WHERE username = ?")
            .bind(username)
            .fetch_one(db.pool())
            .await?;

        Ok(row.0 > 0)
    }
}
