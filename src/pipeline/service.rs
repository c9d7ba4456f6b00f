//! Summary service coordinating extraction, bounding, and the remote model call.

use crate::{
    config::Config,
    extraction::{SubmittedFile, TextExtractor, select_strategy},
    metrics::{MetricsSnapshot, RunMetrics},
    normalize::bound_text,
    summarization::{GeminiClient, SummarizationClient, SummaryLength},
};
use async_trait::async_trait;

use super::{InvalidTransition, PipelineError, RunEvent, RunState, SummaryOutcome, transition};

/// Runs the pipeline for one submitted file at a time.
///
/// The service keeps no state between runs apart from metrics counters; concurrent runs are
/// independent of each other. Construct it once near process start and share it through an
/// `Arc`.
pub struct SummaryService {
    extractor: TextExtractor,
    client: Box<dyn SummarizationClient>,
    metrics: RunMetrics,
}

/// Abstraction over the pipeline used by the HTTP surface.
#[async_trait]
pub trait SummaryApi: Send + Sync {
    /// Extract, bound, and summarize a file.
    async fn summarize(
        &self,
        file: &SubmittedFile,
        length: SummaryLength,
    ) -> Result<SummaryOutcome, PipelineError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl SummaryService {
    /// Build a service from explicit collaborators.
    pub fn new(extractor: TextExtractor, client: Box<dyn SummarizationClient>) -> Self {
        Self {
            extractor,
            client,
            metrics: RunMetrics::new(),
        }
    }

    /// Build the default service: lopdf, tesseract, and the Gemini client.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let client = GeminiClient::from_config(config)?;
        if config.gemini_api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; summarization requests will fail");
        }
        Ok(Self::new(
            TextExtractor::from_config(config),
            Box::new(client),
        ))
    }

    /// Drive one run to a terminal state.
    ///
    /// Extraction strictly precedes summarization. Whitespace-only text stops the run before
    /// the remote call.
    pub async fn run(&self, file: &SubmittedFile, length: SummaryLength) -> RunState {
        let strategy = select_strategy(file.media_type());
        tracing::info!(
            file = file.name(),
            size = file.size(),
            ?strategy,
            length = length.as_str(),
            "Starting summary run"
        );
        let state = match transition(RunState::Idle, RunEvent::Submitted(strategy)) {
            Ok(state) => state,
            Err(invalid) => return self.finish(RunState::Failed(invalid.into())),
        };

        let bounded = match self
            .extractor
            .extract_with(strategy, file)
            .await
            .map_err(PipelineError::from)
            .and_then(|text| bound_text(text).map_err(PipelineError::from))
        {
            Ok(bounded) => bounded,
            Err(error) => return self.fail(state, error),
        };

        let state = match transition(
            state,
            RunEvent::Extracted {
                extracted_chars: bounded.original_chars,
                truncated: bounded.truncated,
            },
        ) {
            Ok(state) => state,
            Err(invalid) => return self.finish(RunState::Failed(invalid.into())),
        };

        let decoded = match self.client.summarise(&bounded.text, length).await {
            Ok(decoded) => decoded,
            Err(error) => return self.fail(state, error.into()),
        };

        let outcome = SummaryOutcome {
            degraded: decoded.is_degraded(),
            result: decoded.into_result(),
            strategy,
            extracted_chars: bounded.original_chars,
            truncated: bounded.truncated,
        };
        let next = transition(state, RunEvent::Summarized(outcome))
            .unwrap_or_else(|invalid| RunState::Failed(invalid.into()));
        self.finish(next)
    }

    /// Run the pipeline and return either the outcome or the error that ended it.
    pub async fn summarize(
        &self,
        file: &SubmittedFile,
        length: SummaryLength,
    ) -> Result<SummaryOutcome, PipelineError> {
        match self.run(file, length).await {
            RunState::Done(outcome) => Ok(outcome),
            RunState::Failed(error) => Err(error),
            other => Err(InvalidTransition {
                state: other.name(),
                event: "finish",
            }
            .into()),
        }
    }

    /// Return the current run metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn fail(&self, state: RunState, error: PipelineError) -> RunState {
        let next = transition(state, RunEvent::Failed(error))
            .unwrap_or_else(|invalid| RunState::Failed(invalid.into()));
        self.finish(next)
    }

    fn finish(&self, state: RunState) -> RunState {
        match &state {
            RunState::Done(outcome) => {
                self.metrics
                    .record_success(outcome.degraded, outcome.truncated);
                tracing::info!(
                    strategy = ?outcome.strategy,
                    extracted_chars = outcome.extracted_chars,
                    truncated = outcome.truncated,
                    degraded = outcome.degraded,
                    key_points = outcome.result.key_points.len(),
                    "Summary run completed"
                );
            }
            RunState::Failed(error) => {
                self.metrics
                    .record_failure(matches!(error, PipelineError::EmptyContent));
                tracing::warn!(error = %error, "Summary run failed");
            }
            other => tracing::error!(state = other.name(), "Summary run stopped early"),
        }
        state
    }
}

#[async_trait]
impl SummaryApi for SummaryService {
    async fn summarize(
        &self,
        file: &SubmittedFile,
        length: SummaryLength,
    ) -> Result<SummaryOutcome, PipelineError> {
        SummaryService::summarize(self, file, length).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        SummaryService::metrics_snapshot(self)
    }
}
