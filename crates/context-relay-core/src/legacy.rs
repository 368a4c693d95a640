//! Recovery of file metadata from a flattened prompt string.
//!
//! Older clients send only a prompt of the form
//!
//! ```text
//! Context from uploaded files:
//! File: <name> (<category>)
//! Content: <preview>...
//!
//! User Query: <question>
//! ```
//!
//! and the relay re-derives the file record from it. The match is
//! best-effort: only the first `File:` header is read, so multi-file
//! prompts log at most one file. Prompts in any other shape (including the
//! `Context:` / `Query:` template built by [`crate::context::build_prompt`])
//! are logged as a bare query.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::context::{uploaded_placeholder, IMAGE_PLACEHOLDER};
use crate::models::InteractionFile;

static FILE_CONTEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Context from uploaded files:\n((?s:.*?))\n\nUser Query: ((?s:.*))")
        .expect("Invalid file context regex")
});

static FILE_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"File: (.*?) \((.*?)\)").expect("Invalid file header regex"));

const CONTENT_MARKER: &str = "Content:";
const CONTENT_END: &str = "...";

/// Query and file metadata recovered from a prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPrompt {
    pub file: Option<InteractionFile>,
    pub query: String,
}

/// Splits a legacy prompt into its file record and user query.
///
/// When the prompt does not match the file-context shape the whole string
/// is returned as the query with no file.
pub fn parse_prompt(prompt: &str) -> ParsedPrompt {
    let whole = || ParsedPrompt {
        file: None,
        query: prompt.to_string(),
    };

    let Some(caps) = FILE_CONTEXT_RE.captures(prompt) else {
        return whole();
    };
    let block = caps.get(1).map_or("", |m| m.as_str());
    let query = caps.get(2).map_or("", |m| m.as_str());
    if block.is_empty() || query.is_empty() {
        return whole();
    }

    ParsedPrompt {
        file: parse_file_block(block),
        query: query.to_string(),
    }
}

fn parse_file_block(block: &str) -> Option<InteractionFile> {
    let caps = FILE_HEADER_RE.captures(block)?;
    let name = caps.get(1).map_or("", |m| m.as_str());
    let category = caps.get(2).map_or("", |m| m.as_str());

    let content = match (category, block.find(CONTENT_MARKER)) {
        ("text", Some(marker)) => {
            let start = marker + CONTENT_MARKER.len();
            let end = block[start..]
                .find(CONTENT_END)
                .map_or(block.len(), |i| start + i);
            block[start..end].trim().to_string()
        }
        ("image", _) => IMAGE_PLACEHOLDER.to_string(),
        (other, _) => uploaded_placeholder(other),
    };

    Some(InteractionFile {
        name: name.to_string(),
        mime_type: None,
        size: None,
        category: category.to_string(),
        content: Some(content),
        processed_at: None,
    })
}
