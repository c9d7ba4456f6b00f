//! Emptiness detection and size bounding for extracted text.
//!
//! Truncation is lossy by policy: summaries of very long documents only reflect the first
//! [`MAX_PROMPT_CHARS`] characters.

use thiserror::Error;

/// Maximum number of characters forwarded to the summarization prompt.
pub const MAX_PROMPT_CHARS: usize = 180_000;

/// Extracted text contained nothing but whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Could not extract any text from this file.")]
pub struct EmptyContent;

/// Text ready to embed into a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedText {
    /// Untrimmed text, cut to at most [`MAX_PROMPT_CHARS`] characters.
    pub text: String,
    /// Character count before truncation.
    pub original_chars: usize,
    /// Whether trailing content was dropped.
    pub truncated: bool,
}

/// Reject whitespace-only text and bound the rest to [`MAX_PROMPT_CHARS`].
pub fn bound_text(text: String) -> Result<BoundedText, EmptyContent> {
    bound_text_to(text, MAX_PROMPT_CHARS)
}

/// Same as [`bound_text`] with an explicit character limit.
pub fn bound_text_to(text: String, max_chars: usize) -> Result<BoundedText, EmptyContent> {
    if text.trim().is_empty() {
        return Err(EmptyContent);
    }

    let original_chars = text.chars().count();
    if original_chars <= max_chars {
        return Ok(BoundedText {
            text,
            original_chars,
            truncated: false,
        });
    }

    let mut text = text;
    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(index, _)| index)
        .unwrap_or(text.len());
    text.truncate(cut);
    tracing::debug!(original_chars, max_chars, "Truncated extracted text");
    Ok(BoundedText {
        text,
        original_chars,
        truncated: true,
    })
}
