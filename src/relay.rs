//! The query relay.
//!
//! [`Relay::handle_query`] takes a [`QueryRequest`], forwards the prompt to
//! the model unchanged, records the exchange in the interaction log and
//! returns the answer.
//!
//! File metadata for the log comes from the request's structured `file` and
//! `query` fields when the client sends them. Requests carrying only a
//! prompt fall back to [`parse_prompt`], which recovers what it can from the
//! flattened string.
//!
//! # Failures
//!
//! | Error | Status |
//! |-------|--------|
//! | [`RelayError::MissingPrompt`] | 400 |
//! | [`RelayError::Upstream`] | the model API's status, body passed through |
//! | [`RelayError::Model`], [`RelayError::Persistence`] | 500 |
//!
//! Whether a failed log write fails the request is set by
//! [`LogFailurePolicy`].

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use context_relay_core::legacy::parse_prompt;
use context_relay_core::log::InteractionLog;
use context_relay_core::models::InteractionRecord;
use context_relay_core::wire::{QueryRequest, QueryResponse};

use crate::config::{LogFailurePolicy, RelayConfig};
use crate::model::{ModelClient, ModelError};

/// Answer returned when the model produced no text.
pub const NO_RESPONSE: &str = "No response generated";

/// Characters of the query shown in the request log line.
const QUERY_LOG_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Prompt is required")]
    MissingPrompt,
    #[error("Failed to get response from AI")]
    Upstream { status: u16, body: String },
    #[error(transparent)]
    Model(ModelError),
    #[error("Failed to save interaction: {0}")]
    Persistence(String),
}

impl From<ModelError> for RelayError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Upstream { status, body } => RelayError::Upstream { status, body },
            other => RelayError::Model(other),
        }
    }
}

pub struct Relay {
    model: Arc<dyn ModelClient>,
    log: Arc<dyn InteractionLog>,
    log_failure: LogFailurePolicy,
}

impl Relay {
    pub fn new(
        config: &RelayConfig,
        model: Arc<dyn ModelClient>,
        log: Arc<dyn InteractionLog>,
    ) -> Self {
        Self {
            model,
            log,
            log_failure: config.log_failure,
        }
    }

    pub async fn handle_query(&self, request: QueryRequest) -> Result<QueryResponse, RelayError> {
        let prompt = request
            .prompt
            .filter(|p| !p.is_empty())
            .ok_or(RelayError::MissingPrompt)?;

        let (file, query) = match (request.file, request.query) {
            (None, None) => {
                let parsed = parse_prompt(&prompt);
                (parsed.file, parsed.query)
            }
            (file, query) => (file, query.unwrap_or_else(|| prompt.clone())),
        };

        tracing::info!(
            target: "relay::query",
            has_file = file.is_some(),
            "Received query: {}...",
            query.chars().take(QUERY_LOG_CHARS).collect::<String>()
        );

        let answer = match self.model.generate(&prompt).await {
            Ok(text) => text.unwrap_or_else(|| NO_RESPONSE.to_string()),
            Err(e) => {
                tracing::error!(target: "relay::model", "Model API error: {}", e);
                return Err(e.into());
            }
        };

        let record = InteractionRecord {
            file,
            query,
            response: answer.clone(),
            timestamp: Utc::now(),
        };

        match self.log.append(&record).await {
            Ok(id) => tracing::debug!(target: "relay::log", %id, "interaction saved"),
            Err(e) => match self.log_failure {
                LogFailurePolicy::Fail => {
                    tracing::error!(target: "relay::log", "Failed to save interaction: {:#}", e);
                    return Err(RelayError::Persistence(format!("{:#}", e)));
                }
                LogFailurePolicy::Ignore => {
                    tracing::warn!(target: "relay::log", "Interaction not saved: {:#}", e);
                }
            },
        }

        tracing::info!(target: "relay::query", "Response generated successfully");
        Ok(QueryResponse { answer })
    }
}
