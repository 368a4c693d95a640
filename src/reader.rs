//! Reading a local file into an [`UploadedFile`].
//!
//! The read is a single awaited operation. PDFs go through
//! [`extract_text`](crate::extract::extract_text); every other file keeps
//! its buffer, decoded as text when it is valid UTF-8.

use std::path::Path;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use context_relay_core::context::classify;
use context_relay_core::models::{FileContent, UploadedFile};

use crate::extract::{extract_text, ExtractError, MIME_PDF};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read {name}: {source}")]
    Extract {
        name: String,
        #[source]
        source: ExtractError,
    },
}

impl ReadError {
    /// Name of the file that failed.
    pub fn file_name(&self) -> &str {
        match self {
            ReadError::Io { name, .. } | ReadError::Extract { name, .. } => name,
        }
    }
}

/// Extension to MIME table standing in for the browser-supplied type.
const MIME_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("json", "application/json"),
    ("pdf", MIME_PDF),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("mov", "video/quicktime"),
];

/// Guesses a MIME type from the file extension. Unknown extensions map to
/// the empty string, as a browser reports for unrecognised files.
pub fn guess_mime_type(file_name: &str) -> &'static str {
    let ext = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return "",
    };
    MIME_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or("")
}

/// Reads and classifies the file at `path`.
pub async fn read_file(path: &Path) -> Result<UploadedFile, ReadError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let bytes = tokio::fs::read(path).await.map_err(|source| ReadError::Io {
        name: name.clone(),
        source,
    })?;

    let mime_type = guess_mime_type(&name);
    Ok(UploadedFile {
        id: Uuid::new_v4(),
        size: bytes.len() as u64,
        category: classify(mime_type, &name),
        content: decode_content(&name, mime_type, bytes).await?,
        mime_type: mime_type.to_string(),
        name,
        processed_at: Utc::now(),
    })
}

async fn decode_content(
    name: &str,
    mime_type: &str,
    bytes: Vec<u8>,
) -> Result<FileContent, ReadError> {
    if mime_type == MIME_PDF {
        // PDF parsing is CPU-bound; keep it off the async workers.
        let text = tokio::task::spawn_blocking(move || extract_text(&bytes))
            .await
            .map_err(|e| ExtractError::Task(e.to_string()))
            .and_then(|r| r)
            .map_err(|source| ReadError::Extract {
                name: name.to_string(),
                source,
            })?;
        return Ok(FileContent::Text(text));
    }

    Ok(match String::from_utf8(bytes) {
        Ok(text) => FileContent::Text(text),
        Err(e) => FileContent::Binary(e.into_bytes()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::minimal_pdf;
    use context_relay_core::models::Category;
    use tempfile::TempDir;

    #[test]
    fn guesses_common_types() {
        assert_eq!(guess_mime_type("notes.TXT"), "text/plain");
        assert_eq!(guess_mime_type("paper.pdf"), MIME_PDF);
        assert_eq!(guess_mime_type("clip.mov"), "video/quicktime");
        assert_eq!(guess_mime_type("archive.xyz"), "");
        assert_eq!(guess_mime_type("Makefile"), "");
    }

    #[tokio::test]
    async fn reads_text_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.md");
        std::fs::write(&path, "# Title\nbody").unwrap();

        let file = read_file(&path).await.unwrap();
        assert_eq!(file.name, "notes.md");
        assert_eq!(file.mime_type, "text/markdown");
        assert_eq!(file.size, 13);
        assert_eq!(file.category, Category::Text);
        assert_eq!(file.content, FileContent::Text("# Title\nbody".to_string()));
    }

    #[tokio::test]
    async fn keeps_binary_buffer() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("pixel.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G', 0xff, 0x00]).unwrap();

        let file = read_file(&path).await.unwrap();
        assert_eq!(file.category, Category::Image);
        assert!(matches!(file.content, FileContent::Binary(ref b) if b.len() == 6));
    }

    #[tokio::test]
    async fn unknown_extension_is_other() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.bin");
        std::fs::write(&path, "plain").unwrap();

        let file = read_file(&path).await.unwrap();
        assert_eq!(file.category, Category::Other);
        assert_eq!(file.mime_type, "");
    }

    #[tokio::test]
    async fn missing_file_error_names_file() {
        let tmp = TempDir::new().unwrap();
        let err = read_file(&tmp.path().join("gone.txt")).await.unwrap_err();
        assert_eq!(err.file_name(), "gone.txt");
        assert!(err.to_string().starts_with("Failed to read gone.txt"));
    }

    #[tokio::test]
    async fn reads_pdf_as_extracted_text() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report.pdf");
        let pdf = minimal_pdf(&["alpha one", "beta two"]);
        std::fs::write(&path, &pdf).unwrap();

        let file = read_file(&path).await.unwrap();
        assert_eq!(file.mime_type, MIME_PDF);
        assert_eq!(file.category, Category::Text);
        assert_eq!(file.size, pdf.len() as u64);
        assert_eq!(
            file.content,
            FileContent::Text("alpha one\nbeta two".to_string())
        );
    }

    #[tokio::test]
    async fn broken_pdf_error_names_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.pdf");
        std::fs::write(&path, "definitely not a pdf").unwrap();

        let err = read_file(&path).await.unwrap_err();
        assert!(matches!(err, ReadError::Extract { .. }));
        assert_eq!(err.file_name(), "broken.pdf");
    }
}
