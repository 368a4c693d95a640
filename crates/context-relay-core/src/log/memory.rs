//! In-memory [`InteractionLog`] used by tests and embedders without a
//! database.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{InteractionRecord, StoredInteraction};

use super::InteractionLog;

#[derive(Default)]
pub struct InMemoryInteractionLog {
    records: RwLock<Vec<StoredInteraction>>,
}

impl InMemoryInteractionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored so far.
    ///
    /// Records are only ever pushed, so a poisoned lock still holds a valid
    /// list and is read through.
    pub fn len(&self) -> usize {
        match self.records.read() {
            Ok(records) => records.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl InteractionLog for InMemoryInteractionLog {
    async fn append(&self, record: &InteractionRecord) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut records = self
            .records
            .write()
            .map_err(|_| anyhow!("interaction log lock poisoned"))?;
        records.push(StoredInteraction {
            id: id.clone(),
            record: record.clone(),
        });
        Ok(id)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<StoredInteraction>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("interaction log lock poisoned"))?;
        Ok(records.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(query: &str) -> InteractionRecord {
        InteractionRecord {
            file: None,
            query: query.to_string(),
            response: "answer".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn append_generates_distinct_ids() {
        let log = InMemoryInteractionLog::new();
        let a = log.append(&record("one")).await.unwrap();
        let b = log.append(&record("one")).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn len_survives_poisoned_lock() {
        let log = InMemoryInteractionLog::new();
        log.append(&record("kept")).await.unwrap();

        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = log.records.write().unwrap();
            panic!("writer died");
        }));
        assert!(poisoned.is_err());
        assert!(log.records.is_poisoned());

        assert_eq!(log.len(), 1);
        assert!(!log.is_empty());
        assert!(log.recent(1).await.is_err());
    }

    #[tokio::test]
    async fn recent_returns_newest_first() {
        let log = InMemoryInteractionLog::new();
        for q in ["first", "second", "third"] {
            log.append(&record(q)).await.unwrap();
        }
        let recent = log.recent(2).await.unwrap();
        let queries: Vec<&str> = recent.iter().map(|r| r.record.query.as_str()).collect();
        assert_eq!(queries, vec!["third", "second"]);
    }
}
