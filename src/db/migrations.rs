//! Database migrations

use anyhow::Result;
use tracing::info;

use super::DbEngine;

/// Current migration version
const CURRENT_VERSION: i32 = 1;

/// Run database migrations
pub async fn run_migrations(db: &DbEngine) -> Result<()> {
    let current_version = get_migration_version(db).await?;

    if current_version >= CURRENT_VERSION {
        info!("Database is up to date (version {})", current_version);
        return Ok(());
    }

    info!(
        "Running migrations from version {} to {}",
        current_version, CURRENT_VERSION
    );

    for version in (current_version + 1)..=CURRENT_VERSION {
        run_migration(db, version).await?;

        sqlx::query("UPDATE dbmigration SET version = ? WHERE id = 1")
            .bind(version)
            .execute(db.pool())
            .await?;

        info!("Applied migration {}", version);
    }

    Ok(())
}

async fn run_migration(db: &DbEngine, version: i32) -> Result<()> {
    match version {
        1 => {
            // databases created before granted scopes were stored
            let has_column: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM pragma_table_info('spotify_token') WHERE name = 'scope'",
            )
            .fetch_one(db.pool())
            .await?;

            if has_column == 0 {
                sqlx::query("ALTER TABLE spotify_token ADD COLUMN scope TEXT")
                    .execute(db.pool())
                    .await?;
            }
        }
        _ => {
            tracing::warn!("Unknown migration version: {}", version);
        }
    }

    Ok(())
}

/// Get the current migration version
pub async fn get_migration_version(db: &DbEngine) -> Result<i32> {
    let row: (i32,) = sqlx::query_as("SELECT version FROM dbmigration WHERE id = 1")
        .fetch_one(db.pool())
        .await?;

    Ok(row.0)
}
