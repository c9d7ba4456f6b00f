use super::{
    Decoded, SummarizationClient, SummarizationError, SummaryLength, build_prompt, decode_reply,
};
use crate::config::{API_KEY_VAR, Config, ConfigError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f64 = 0.3;

/// Client for the `generateContent` endpoint of a hosted Gemini model.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Build a client. A missing key is accepted here and reported on the first request.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, SummarizationError> {
        let http = Client::builder()
            .user_agent("docsum/summary")
            .build()
            .map_err(|error| {
                SummarizationError::Transport(format!("failed to build HTTP client: {error}"))
            })?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
        })
    }

    /// Build a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, SummarizationError> {
        Self::new(
            config.gemini_base_url.clone(),
            config.gemini_model.clone(),
            config.gemini_api_key.clone(),
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

// Every level may be missing or explicitly `null`; both read as an empty reply.
#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
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
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, or an empty string.
    fn into_text(self) -> String {
        self.candidates
            .and_then(|candidates| candidates.into_iter().next())
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts)
            .and_then(|parts| parts.into_iter().next())
            .and_then(|part| part.text)
            .unwrap_or_default()
    }
}

/// Longest prefix of an error body written to logs.
const LOGGED_BODY_CHARS: usize = 512;

fn body_preview(body: &str) -> &str {
    match body.char_indices().nth(LOGGED_BODY_CHARS) {
        Some((cut, _)) => &body[..cut],
        None => body,
    }
}

#[async_trait]
impl SummarizationClient for GeminiClient {
    async fn summarise(
        &self,
        text: &str,
        length: SummaryLength,
    ) -> Result<Decoded, SummarizationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVariable(API_KEY_VAR.into()))?;

        let payload = json!({
            "contents": [{
                "parts": [{ "text": build_prompt(text, length) }]
            }],
            "generationConfig": {
                "temperature": TEMPERATURE,
            }
        });

        tracing::debug!(
            model = %self.model,
            length = length.as_str(),
            chars = text.chars().count(),
            "Requesting summary"
        );

        // Errors drop the URL so the key in the query string never reaches logs.
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationError::Transport(format!(
                    "failed to reach {}: {}",
                    self.base_url,
                    error.without_url()
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Summarization request failed");
            tracing::debug!(body = body_preview(&body), "Summarization error body");
            return Err(SummarizationError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GenerateContentResponse = response.json().await.map_err(|error| {
            SummarizationError::InvalidEnvelope(error.without_url().to_string())
        })?;

        let decoded = decode_reply(&envelope.into_text());
        if decoded.is_degraded() {
            tracing::info!("Model reply was not structured JSON; returning raw text summary");
        }
        Ok(decoded)
    }
}
