use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Creates the database file and schema. Idempotent.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    ensure_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    // Timestamps are unix milliseconds. File columns are all NULL when the
    // interaction had no file.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS interactions (
            id TEXT PRIMARY KEY,
            file_name TEXT,
            file_type TEXT,
            file_size INTEGER,
            file_category TEXT,
            file_content TEXT,
            file_processed_at INTEGER,
            query TEXT NOT NULL,
            response TEXT NOT NULL,
            timestamp INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_interactions_timestamp ON interactions(timestamp DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
