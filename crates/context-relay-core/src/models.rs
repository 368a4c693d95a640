//! Core data models shared by the client and the relay.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse file-type classification used to choose how content is rendered
/// into a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Text,
    Image,
    Audio,
    Video,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Text,
        Category::Image,
        Category::Audio,
        Category::Video,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Text => "text",
            Category::Image => "image",
            Category::Audio => "audio",
            Category::Video => "video",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown file category: '{}'", s))
    }
}

/// Content held for an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// Extracted (PDF) or decoded (UTF-8) text.
    Text(String),
    /// Raw buffer for files that are not text.
    Binary(Vec<u8>),
}

impl FileContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FileContent::Text(s) => Some(s),
            FileContent::Binary(_) => None,
        }
    }
}

/// A file selected by the user, classified and with its content extracted.
///
/// Lives only in client memory for the duration of a query; the binary is
/// never persisted.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub id: Uuid,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub category: Category,
    pub content: FileContent,
    pub processed_at: DateTime<Utc>,
}

impl UploadedFile {
    /// Text used when this file is rendered into a prompt.
    ///
    /// Binary buffers render as `[<category> file, <n> bytes]`.
    pub fn prompt_text(&self) -> Cow<'_, str> {
        match &self.content {
            FileContent::Text(s) => Cow::Borrowed(s.as_str()),
            FileContent::Binary(bytes) => {
                Cow::Owned(format!("[{} file, {} bytes]", self.category, bytes.len()))
            }
        }
    }
}

/// File metadata stored with an interaction.
///
/// Every field except `name` and `category` is optional because records
/// recovered from a bare prompt string only carry those two plus content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionFile {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub category: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

/// One logged (file, query, answer) exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub file: Option<InteractionFile>,
    pub query: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// An [`InteractionRecord`] together with the identifier the log assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredInteraction {
    pub id: String,
    #[serde(flatten)]
    pub record: InteractionRecord,
}
