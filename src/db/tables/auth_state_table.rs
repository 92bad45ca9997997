//! Single-use OAuth state tokens

use anyhow::Result;

use crate::db::DbEngine;

pub struct AuthStateTable;

impl AuthStateTable {
    /// Store a freshly minted state for the user starting a connect
    pub async fn insert(db: &DbEngine, state: &str, user_id: i64, created_at: i64) -> Result<()> {
        sqlx::query("INSERT INTO spotify_auth_state (state, user_id, created_at) VALUES (?, ?, ?)")
            .bind(state)
            .bind(user_id)
            .bind(created_at)
            .execute(db.pool())
            .await?;

        Ok(())
    }

    /// Delete the state and return its owner.
    ///
    /// Lookup and removal are one statement, so two callbacks racing on the
    /// same state can never both succeed.
    pub async fn consume(db: &DbEngine, state: &str) -> Result<Option<i64>> {
        let user_id: Option<i64> =
            sqlx::query_scalar("DELETE FROM spotify_auth_state WHERE state = ? RETURNING user_id")
                .bind(state)
                .fetch_optional(db.pool())
                .await?;

        Ok(user_id)
    }

    /// Drop states created before `cutoff`
    pub async fn prune_older_than(db: &DbEngine, cutoff: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM spotify_auth_state WHERE created_at < ?")
            .bind(cutoff)
            .execute(db.pool())
            .await?;

        Ok(result.rows_affected())
    }
}
