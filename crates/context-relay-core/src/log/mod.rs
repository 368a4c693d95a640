//! Storage abstraction for the interaction log.
//!
//! The [`InteractionLog`] trait is the append-only record store the relay
//! writes to after every successful model call. Backends own identifier
//! generation and their own concurrency guarantees.
//!
//! Implementations must be `Send + Sync` to be shared across request
//! handlers.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{InteractionRecord, StoredInteraction};

/// Append-only store of [`InteractionRecord`]s.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`append`](InteractionLog::append) | Store a record, returning its generated ID |
/// | [`recent`](InteractionLog::recent) | List the newest records first |
#[async_trait]
pub trait InteractionLog: Send + Sync {
    /// Store a record. Returns the generated identifier.
    async fn append(&self, record: &InteractionRecord) -> Result<String>;

    /// Return up to `limit` records, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<StoredInteraction>>;
}
