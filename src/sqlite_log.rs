//! SQLite-backed [`InteractionLog`] implementation.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use context_relay_core::log::InteractionLog;
use context_relay_core::models::{InteractionFile, InteractionRecord, StoredInteraction};

/// Stores interactions in the `interactions` table created by
/// [`ensure_schema`](crate::migrate::ensure_schema).
pub struct SqliteInteractionLog {
    pool: SqlitePool,
}

impl SqliteInteractionLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

fn row_to_interaction(row: &SqliteRow) -> Result<StoredInteraction> {
    let file = match row.try_get::<Option<String>, _>("file_name")? {
        Some(name) => Some(InteractionFile {
            name,
            mime_type: row.try_get("file_type")?,
            size: row
                .try_get::<Option<i64>, _>("file_size")?
                .and_then(|s| u64::try_from(s).ok()),
            category: row
                .try_get::<Option<String>, _>("file_category")?
                .unwrap_or_default(),
            content: row.try_get("file_content")?,
            processed_at: row
                .try_get::<Option<i64>, _>("file_processed_at")?
                .map(from_millis),
        }),
        None => None,
    };

    Ok(StoredInteraction {
        id: row.try_get("id")?,
        record: InteractionRecord {
            file,
            query: row.try_get("query")?,
            response: row.try_get("response")?,
            timestamp: from_millis(row.try_get("timestamp")?),
        },
    })
}

#[async_trait]
impl InteractionLog for SqliteInteractionLog {
    async fn append(&self, record: &InteractionRecord) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let file = record.file.as_ref();

        sqlx::query(
            r#"
            INSERT INTO interactions (id, file_name, file_type, file_size, file_category,
                                      file_content, file_processed_at, query, response, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(file.map(|f| f.name.as_str()))
        .bind(file.and_then(|f| f.mime_type.as_deref()))
        .bind(file.and_then(|f| f.size).and_then(|s| i64::try_from(s).ok()))
        .bind(file.map(|f| f.category.as_str()))
        .bind(file.and_then(|f| f.content.as_deref()))
        .bind(file.and_then(|f| f.processed_at).map(|t| t.timestamp_millis()))
        .bind(&record.query)
        .bind(&record.response)
        .bind(record.timestamp.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<StoredInteraction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, file_name, file_type, file_size, file_category, file_content,
                   file_processed_at, query, response, timestamp
            FROM interactions
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_interaction).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::migrate::ensure_schema;
    use tempfile::TempDir;

    async fn open_log(tmp: &TempDir) -> SqliteInteractionLog {
        let url = format!("sqlite:{}", tmp.path().join("log.sqlite").display());
        let pool = db::connect_url(&url).await.unwrap();
        ensure_schema(&pool).await.unwrap();
        SqliteInteractionLog::new(pool)
    }

    fn record(query: &str, file: Option<InteractionFile>) -> InteractionRecord {
        InteractionRecord {
            file,
            query: query.to_string(),
            response: format!("answer to {}", query),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn append_and_read_back_with_file() {
        let tmp = TempDir::new().unwrap();
        let log = open_log(&tmp).await;
        let processed = from_millis(Utc::now().timestamp_millis());
        let file = InteractionFile {
            name: "a.txt".to_string(),
            mime_type: Some("text/plain".to_string()),
            size: Some(5),
            category: "text".to_string(),
            content: Some("hello".to_string()),
            processed_at: Some(processed),
        };

        let id = log.append(&record("what?", Some(file.clone()))).await.unwrap();
        let stored = log.recent(10).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].record.file.as_ref(), Some(&file));
        assert_eq!(stored[0].record.query, "what?");
        assert_eq!(stored[0].record.response, "answer to what?");
    }

    #[tokio::test]
    async fn null_file_round_trips_as_none() {
        let tmp = TempDir::new().unwrap();
        let log = open_log(&tmp).await;
        log.append(&record("bare", None)).await.unwrap();
        let stored = log.recent(1).await.unwrap();
        assert!(stored[0].record.file.is_none());
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let tmp = TempDir::new().unwrap();
        let log = open_log(&tmp).await;
        for q in ["one", "two", "three"] {
            log.append(&record(q, None)).await.unwrap();
        }
        let stored = log.recent(2).await.unwrap();
        let queries: Vec<&str> = stored.iter().map(|s| s.record.query.as_str()).collect();
        assert_eq!(queries, vec!["three", "two"]);
    }

    #[tokio::test]
    async fn schema_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let log = open_log(&tmp).await;
        ensure_schema(log.pool()).await.unwrap();
        ensure_schema(log.pool()).await.unwrap();
    }
}
