//! Spotify token records

use anyhow::Result;
use sqlx::FromRow;

use crate::db::DbEngine;
use crate::models::TokenRecord;

#[derive(Debug, FromRow)]
struct TokenRow {
    user_id: i64,
    access_token: String,
    refresh_token: String,
    expires_at: i64,
    scope: Option<String>,
}

impl TokenRow {
    fn into_record(self) -> TokenRecord {
        TokenRecord {
            user_id: self.user_id,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self.expires_at,
            scope: self.scope,
        }
    }
}

pub struct SpotifyTokenTable;

impl SpotifyTokenTable {
    pub async fn get(db: &DbEngine, user_id: i64) -> Result<Option<TokenRecord>> {
        let row: Option<TokenRow> = sqlx::query_as(
            "SELECT user_id, access_token, refresh_token, expires_at, scope FROM spotify_token WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(db.pool())
        .await?;

        Ok(row.map(|r| r.into_record()))
    }

    /// Insert or replace the user's record in one statement
    pub async fn upsert(db: &DbEngine, record: &TokenRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO spotify_token (user_id, access_token, refresh_token, expires_at, scope, updated_at)
            VALUES (?, ?, ?, ?, ?, strftime('%s','now'))
            ON CONFLICT(user_id) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                expires_at = excluded.expires_at,
                scope = excluded.scope,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(record.user_id)
        .bind(&record.access_token)
        .bind(&record.refresh_token)
        .bind(record.expires_at)
        .bind(&record.scope)
        .execute(db.pool())
        .await?;

        Ok(())
    }

    pub async fn delete(db: &DbEngine, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM spotify_token WHERE user_id = ?")
            .bind(user_id)
            .execute(db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
