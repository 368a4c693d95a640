//! Client side of the relay: validates input, builds the prompt and posts
//! it to `/api/query`.
//!
//! Besides the prompt string the request carries the raw question and the
//! structured metadata of the first file, so the relay can log them without
//! re-parsing the prompt.

use thiserror::Error;

use context_relay_core::context::{build_context, build_prompt, describe_file};
use context_relay_core::models::UploadedFile;
use context_relay_core::wire::{ErrorResponse, QueryRequest, QueryResponse};

/// Shown when the relay answered without an `answer` field.
pub const NO_ANSWER: &str = "No response";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Please enter a question")]
    EmptyQuestion,
    #[error("Please upload at least one file")]
    NoFiles,
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Backend(e.to_string())
    }
}

/// Checks the question and file count before any file is read or any
/// request is sent.
pub fn validate_input(question: &str, file_count: usize) -> Result<(), ClientError> {
    if question.trim().is_empty() {
        return Err(ClientError::EmptyQuestion);
    }
    if file_count == 0 {
        return Err(ClientError::NoFiles);
    }
    Ok(())
}

/// Assembles the request body for `files` and `question`.
pub fn build_request(files: &[UploadedFile], question: &str) -> Result<QueryRequest, ClientError> {
    validate_input(question, files.len())?;

    let context = build_context(files);
    Ok(QueryRequest {
        prompt: Some(build_prompt(&context, question)),
        query: Some(question.to_string()),
        file: files.first().map(describe_file),
    })
}

pub struct RelayClient {
    http: reqwest::Client,
    url: String,
}

impl RelayClient {
    /// `url` is the full query endpoint, e.g. `http://127.0.0.1:5000/api/query`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Asks `question` about `files` and returns the model's answer.
    pub async fn ask(&self, files: &[UploadedFile], question: &str) -> Result<String, ClientError> {
        let request = build_request(files, question)?;

        let response = self.http.post(&self.url).json(&request).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let reason = match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(err) => match err.details.or(err.message) {
                    Some(extra) => format!("{} ({}): {}", err.error, status, extra),
                    None => format!("{} ({})", err.error, status),
                },
                Err(_) => format!("{}: {}", status, text),
            };
            return Err(ClientError::Backend(reason));
        }

        Ok(serde_json::from_str::<QueryResponse>(&text)
            .map(|r| r.answer)
            .ok()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| NO_ANSWER.to_string()))
    }
}
