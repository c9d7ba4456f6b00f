//! Outcome and error types for a pipeline run.

use crate::{
    extraction::{ExtractionError, ExtractionStrategy},
    normalize::EmptyContent,
    summarization::{SummarizationError, SummaryResult},
};
use serde::Serialize;
use thiserror::Error;

use super::InvalidTransition;

/// Errors that end a run. The `Display` text is the message shown to the user.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Remote credential or setting is missing.
    #[error("Summarization is not configured: {0}")]
    Configuration(String),
    /// The extraction engine could not process the file.
    #[error("{0}")]
    Extraction(#[from] ExtractionError),
    /// Extraction produced only whitespace; no remote call was made.
    #[error("Could not extract any text from this file.")]
    EmptyContent,
    /// The summarization service answered with a non-success status.
    #[error("Summarization service returned status {status}")]
    RemoteService {
        /// HTTP status code.
        status: u16,
    },
    /// The summarization service could not be reached.
    #[error("Failed to reach summarization service: {0}")]
    Transport(String),
    /// The summarization service answered with an unreadable envelope.
    #[error("Malformed provider response: {0}")]
    InvalidEnvelope(String),
    /// The run was driven through an illegal state change.
    #[error("Internal pipeline error: {0}")]
    InvalidTransition(#[from] InvalidTransition),
}

impl From<EmptyContent> for PipelineError {
    fn from(_: EmptyContent) -> Self {
        Self::EmptyContent
    }
}

impl From<SummarizationError> for PipelineError {
    fn from(error: SummarizationError) -> Self {
        match error {
            SummarizationError::Configuration(error) => Self::Configuration(error.to_string()),
            SummarizationError::RemoteStatus { status, .. } => Self::RemoteService { status },
            SummarizationError::Transport(message) => Self::Transport(message),
            SummarizationError::InvalidEnvelope(message) => Self::InvalidEnvelope(message),
        }
    }
}

/// Successful result of a run plus what happened along the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryOutcome {
    /// Summary and key points.
    #[serde(flatten)]
    pub result: SummaryResult,
    /// The model reply was not structured and was used verbatim.
    pub degraded: bool,
    /// Strategy used to acquire the text.
    pub strategy: ExtractionStrategy,
    /// Characters extracted before bounding.
    pub extracted_chars: usize,
    /// Extracted text was cut before summarization.
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_status_keeps_code_and_drops_body() {
        let error = PipelineError::from(SummarizationError::RemoteStatus {
            status: 429,
            body: "quota exceeded for key".into(),
        });
        assert!(matches!(error, PipelineError::RemoteService { status: 429 }));
        assert_eq!(error.to_string(), "Summarization service returned status 429");
    }

    #[test]
    fn outcome_serializes_flat() {
        let outcome = SummaryOutcome {
            result: SummaryResult {
                summary: "S".into(),
                key_points: vec!["k".into()],
            },
            degraded: false,
            strategy: ExtractionStrategy::StructuredDocument,
            extracted_chars: 10,
            truncated: false,
        };
        let value = serde_json::to_value(&outcome).expect("json");
        assert_eq!(value["summary"], "S");
        assert_eq!(value["key_points"][0], "k");
        assert_eq!(value["strategy"], "structured_document");
    }
}
