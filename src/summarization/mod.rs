//! Abstractive summarization through a hosted language model.
//!
//! One request is issued per call, with no retries. The model reply is decoded leniently:
//! a JSON object embedded anywhere in the reply becomes a [`Decoded::Structured`] result, and
//! anything else is kept verbatim as [`Decoded::Fallback`] so callers always have something to
//! display.

mod decode;
mod gemini;
mod prompt;

use crate::config::ConfigError;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use decode::{decode_reply, json_candidate};
pub use gemini::{GeminiClient, TEMPERATURE};
pub use prompt::{NO_READABLE_CONTENT, build_prompt};

/// Errors surfaced while requesting a summary.
#[derive(Debug, Error)]
pub enum SummarizationError {
    /// Required credential or setting is missing; no request was made.
    #[error("Summarization is not configured: {0}")]
    Configuration(#[from] ConfigError),
    /// Provider answered with a non-success status.
    #[error("Summarization service returned status {status}")]
    RemoteStatus {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Response body; a capped prefix is logged at debug level.
        body: String,
    },
    /// Provider could not be reached.
    #[error("Failed to reach summarization service: {0}")]
    Transport(String),
    /// Provider answered successfully but the envelope was not valid JSON.
    #[error("Malformed provider response: {0}")]
    InvalidEnvelope(String),
}

/// Target size of the generated summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    /// Roughly 80 to 120 words.
    Short,
    /// Roughly 150 to 250 words.
    #[default]
    Medium,
    /// Roughly 300 to 450 words.
    Long,
}

impl SummaryLength {
    /// Map a caller-supplied label; missing or unknown labels select [`SummaryLength::Medium`].
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("short") => Self::Short,
            Some("medium") => Self::Medium,
            Some("long") => Self::Long,
            _ => Self::default(),
        }
    }

    /// Target word range quoted in the prompt.
    pub fn word_range(self) -> &'static str {
        match self {
            Self::Short => "80-120",
            Self::Medium => "150-250",
            Self::Long => "300-450",
        }
    }

    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

/// Structured summary shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryResult {
    /// Summary prose.
    pub summary: String,
    /// Key points in presentation order.
    pub key_points: Vec<String>,
}

/// Outcome of decoding a model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The reply contained a parseable JSON object.
    Structured(SummaryResult),
    /// The reply could not be parsed; the raw text is kept as-is.
    Fallback(String),
}

impl Decoded {
    /// Whether decoding fell back to the raw reply.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// Collapse into a displayable result; a fallback becomes the summary with no key points.
    pub fn into_result(self) -> SummaryResult {
        match self {
            Self::Structured(result) => result,
            Self::Fallback(raw) => SummaryResult {
                summary: raw,
                key_points: Vec::new(),
            },
        }
    }
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Summarize already-bounded text with one remote call.
    async fn summarise(
        &self,
        text: &str,
        length: SummaryLength,
    ) -> Result<Decoded, SummarizationError>;
}
