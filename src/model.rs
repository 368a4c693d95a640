//! Remote language model client.
//!
//! [`ModelClient`] is the seam between the relay and the hosted model;
//! [`GeminiClient`] implements it against the Gemini `generateContent`
//! endpoint:
//!
//! ```text
//! POST {endpoint}/models/{model}:generateContent?key=<api key>
//! { "contents": [ { "parts": [ { "text": "<prompt>" } ] } ] }
//! ```
//!
//! There is no retry and no client-side timeout: a non-success status is
//! returned to the caller as [`ModelError::Upstream`] with the raw body.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ModelConfig;

#[derive(Debug, Error)]
pub enum ModelError {
    /// The API answered with a non-success status.
    #[error("model API error {status}: {body}")]
    Upstream { status: u16, body: String },
    /// The request could not be sent or the response could not be read.
    #[error("model request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// A hosted model that turns a prompt into text.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends `prompt` as a single-part message.
    ///
    /// Returns `Ok(None)` when the model answered without any text.
    async fn generate(&self, prompt: &str) -> Result<Option<String>, ModelError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

// The API may send `null` for any of these, so every level is optional.
#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate, if non-empty.
    fn first_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.is_empty())
    }
}

/// Client for the Gemini `generateContent` API.
pub struct GeminiClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl GeminiClient {
    /// Builds a client, reading the API key from the environment.
    pub fn new(config: &ModelConfig) -> anyhow::Result<Self> {
        let api_key = config.api_key()?;
        Ok(Self::with_api_key(config, api_key))
    }

    pub fn with_api_key(config: &ModelConfig, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: config.generate_url(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, ModelError> {
        let body = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        tracing::debug!(target: "relay::model", url = %self.url, prompt_len = prompt.len(), "calling model");

        let response = self
            .http
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ModelError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        Ok(parsed.first_text())
    }
}
