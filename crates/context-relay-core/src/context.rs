//! Client-side context building.
//!
//! Turns classified files into the text block embedded in a prompt, and
//! wraps that block together with the user's question using fixed
//! templates.
//!
//! ```text
//! File: notes.txt
//! Content: <first 1000 characters>...
//!
//! File: report.pdf
//! Content: <first 1000 characters>...
//! ```

use crate::models::{Category, InteractionFile, UploadedFile};

/// Number of characters of each file's content included in a prompt.
pub const PREVIEW_CHARS: usize = 1000;

/// Marker appended after every content preview, truncated or not.
pub const ELLIPSIS: &str = "...";

/// Content logged for image files in place of their bytes.
pub const IMAGE_PLACEHOLDER: &str = "Image file uploaded (visual content available)";

/// Classification rules, checked in order. A file matches a rule when its
/// MIME type starts with the prefix or its extension is listed.
const RULES: &[(Category, &str, &[&str])] = &[
    (Category::Text, "text/", &["txt", "md", "pdf", "docx", "pptx"]),
    (Category::Image, "image/", &["png", "jpg", "jpeg", "gif", "webp"]),
    (Category::Audio, "audio/", &["mp3", "wav", "ogg"]),
    (Category::Video, "video/", &["mp4", "webm", "mov"]),
];

/// Classifies a file by MIME type, falling back to its extension.
///
/// Total: anything unrecognised is [`Category::Other`].
pub fn classify(mime_type: &str, file_name: &str) -> Category {
    let ext = extension(file_name);
    RULES
        .iter()
        .find(|(_, prefix, exts)| {
            mime_type.starts_with(*prefix)
                || ext.as_deref().is_some_and(|e| exts.contains(&e))
        })
        .map(|(category, _, _)| *category)
        .unwrap_or(Category::Other)
}

/// Lowercased text after the last `.` in a file name, if any.
fn extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Returns at most the first [`PREVIEW_CHARS`] characters of `content`.
///
/// The cut ignores word boundaries but never splits a character.
pub fn truncate_preview(content: &str) -> &str {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// Builds the context block for a set of files.
///
/// Each entry is `File: <name>\nContent: <preview>...`; entries are joined
/// with a blank line.
pub fn build_context(files: &[UploadedFile]) -> String {
    files
        .iter()
        .map(|f| {
            format!(
                "File: {}\nContent: {}{}",
                f.name,
                truncate_preview(&f.prompt_text()),
                ELLIPSIS
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Wraps a context block and a question into the prompt sent to the model.
pub fn build_prompt(context: &str, query: &str) -> String {
    format!("Context:\n{}\n\nQuery:\n{}", context, query)
}

/// Content recorded in the log for files that are not text.
pub fn uploaded_placeholder(category: &str) -> String {
    format!("{} file uploaded", category)
}

/// Structured metadata for `file`, sent to the relay alongside the prompt.
pub fn describe_file(file: &UploadedFile) -> InteractionFile {
    let content = match file.category {
        Category::Text => truncate_preview(&file.prompt_text()).to_string(),
        Category::Image => IMAGE_PLACEHOLDER.to_string(),
        other => uploaded_placeholder(other.as_str()),
    };
    InteractionFile {
        name: file.name.clone(),
        mime_type: Some(file.mime_type.clone()),
        size: Some(file.size),
        category: file.category.to_string(),
        content: Some(content),
        processed_at: Some(file.processed_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileContent;
    use chrono::Utc;
    use uuid::Uuid;

    fn text_file(name: &str, content: &str) -> UploadedFile {
        UploadedFile {
            id: Uuid::new_v4(),
            name: name.to_string(),
            mime_type: "text/plain".to_string(),
            size: content.len() as u64,
            category: Category::Text,
            content: FileContent::Text(content.to_string()),
            processed_at: Utc::now(),
        }
    }

    #[test]
    fn classify_prefers_mime_prefix() {
        assert_eq!(classify("text/csv", "data.bin"), Category::Text);
        assert_eq!(classify("image/svg+xml", "logo"), Category::Image);
        assert_eq!(classify("audio/flac", "x"), Category::Audio);
        assert_eq!(classify("video/x-matroska", "x"), Category::Video);
    }

    #[test]
    fn classify_falls_back_to_extension() {
        assert_eq!(classify("application/pdf", "Report.PDF"), Category::Text);
        assert_eq!(classify("", "notes.md"), Category::Text);
        assert_eq!(classify("application/octet-stream", "a.JPEG"), Category::Image);
        assert_eq!(classify("", "track.ogg"), Category::Audio);
        assert_eq!(classify("", "clip.mov"), Category::Video);
    }

    #[test]
    fn classify_checks_text_before_image() {
        // A text MIME type wins over an image extension.
        assert_eq!(classify("text/plain", "photo.png"), Category::Text);
        // The text extension list is checked before the image MIME prefix.
        assert_eq!(classify("image/png", "slides.pptx"), Category::Text);
    }

    #[test]
    fn classify_is_total() {
        let names = ["", ".", "noext", "a.", "archive.tar.gz", ".md", "weird.💾"];
        let mimes = ["", "application/zip", "TEXT/plain", "💾"];
        for name in names {
            for mime in mimes {
                let c = classify(mime, name);
                assert!(Category::ALL.contains(&c));
            }
        }
        assert_eq!(classify("", "archive.tar.gz"), Category::Other);
        assert_eq!(classify("", ".md"), Category::Text);
        assert_eq!(classify("TEXT/plain", "noext"), Category::Other);
    }

    #[test]
    fn context_truncates_to_exactly_preview_chars() {
        let long = "é".repeat(PREVIEW_CHARS + 250);
        let ctx = build_context(&[text_file("big.txt", &long)]);
        let body = ctx.strip_prefix("File: big.txt\nContent: ").unwrap();
        let preview = body.strip_suffix(ELLIPSIS).unwrap();
        assert_eq!(preview.chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn context_always_appends_marker() {
        let ctx = build_context(&[text_file("a.txt", "hello")]);
        assert_eq!(ctx, "File: a.txt\nContent: hello...");

        let ctx = build_context(&[text_file("empty.txt", "")]);
        assert_eq!(ctx, "File: empty.txt\nContent: ...");
    }

    #[test]
    fn context_joins_entries_with_blank_line() {
        let ctx = build_context(&[text_file("a.txt", "one"), text_file("b.txt", "two")]);
        assert_eq!(ctx, "File: a.txt\nContent: one...\n\nFile: b.txt\nContent: two...");
        assert_eq!(build_context(&[]), "");
    }

    #[test]
    fn prompt_uses_fixed_template() {
        assert_eq!(
            build_prompt("File: a.txt\nContent: hi...", "what?"),
            "Context:\nFile: a.txt\nContent: hi...\n\nQuery:\nwhat?"
        );
    }

    #[test]
    fn describe_file_renders_placeholders_by_category() {
        let mut file = text_file("pic.png", "ignored");
        file.category = Category::Image;
        assert_eq!(describe_file(&file).content.as_deref(), Some(IMAGE_PLACEHOLDER));

        file.category = Category::Video;
        assert_eq!(
            describe_file(&file).content.as_deref(),
            Some("video file uploaded")
        );

        let text = text_file("a.txt", &"x".repeat(PREVIEW_CHARS * 2));
        let described = describe_file(&text);
        assert_eq!(described.category, "text");
        assert_eq!(described.content.unwrap().len(), PREVIEW_CHARS);
        assert_eq!(described.mime_type.as_deref(), Some("text/plain"));
    }
}
