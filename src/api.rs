//! HTTP surface for Docsum.
//!
//! The router exposes a handful of endpoints:
//!
//! - `POST /summarize` – Multipart upload with a `file` part and an optional `length` part
//!   (`short` | `medium` | `long`). Returns `{ summary, key_points, degraded, strategy,
//!   extracted_chars, truncated }` or `{ error }`.
//! - `GET /metrics` – Run counters since startup.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.

use crate::extraction::{ExtractionError, SubmittedFile};
use crate::pipeline::{PipelineError, SummaryApi, SummaryOutcome};
use crate::summarization::SummaryLength;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Upload size accepted when no explicit limit is configured.
pub const DEFAULT_BODY_LIMIT: usize = 25 * 1024 * 1024;

/// Build the HTTP router with the default upload limit.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: SummaryApi + 'static,
{
    create_router_with_limit(service, DEFAULT_BODY_LIMIT)
}

/// Build the HTTP router, rejecting request bodies larger than `max_upload_bytes`.
pub fn create_router_with_limit<S>(service: Arc<S>, max_upload_bytes: usize) -> Router
where
    S: SummaryApi + 'static,
{
    Router::new()
        .route("/summarize", post(summarize_document::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(service)
}

/// Summarize an uploaded file.
///
/// The `file` part's filename and content type are taken as the display name and declared
/// media type. Unknown parts are ignored.
async fn summarize_document<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<SummaryOutcome>, AppError>
where
    S: SummaryApi,
{
    let mut file = None;
    let mut length = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(AppError::Upload)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let media_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(AppError::Upload)?;
                tracing::debug!(file = %file_name, media_type = ?media_type, bytes = bytes.len(), "File received");
                file = Some(SubmittedFile::new(file_name, media_type, bytes.to_vec()));
            }
            "length" => {
                let label = field
                    .text()
                    .await
                    .map_err(AppError::Upload)?;
                length = Some(label);
            }
            other => tracing::debug!(part = other, "Ignoring unknown multipart part"),
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest("No file uploaded".into()))?;
    let length = SummaryLength::from_label(length.as_deref().map(str::trim));
    let outcome = service.summarize(&file, length).await?;
    Ok(Json(outcome))
}

/// Return run counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: SummaryApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: "Upload a PDF, image, or text file as multipart/form-data (`file`, optional `length`). Response returns { \"summary\": string, \"key_points\": [string] } plus run details.",
                request_example: Some(json!({
                    "file": "@report.pdf;type=application/pdf",
                    "length": "short | medium | long"
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return run counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    BadRequest(String),
    Upload(MultipartError),
    Pipeline(PipelineError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upload(error) => error.status(),
            Self::Pipeline(error) => match error {
                PipelineError::EmptyContent => StatusCode::UNPROCESSABLE_ENTITY,
                PipelineError::Extraction(ExtractionError::EngineUnavailable(_)) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                PipelineError::Extraction(_) => StatusCode::BAD_REQUEST,
                PipelineError::RemoteService { .. }
                | PipelineError::Transport(_)
                | PipelineError::InvalidEnvelope(_) => StatusCode::BAD_GATEWAY,
                PipelineError::Configuration(_) | PipelineError::InvalidTransition(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn message(&self) -> String {
        match self {
            Self::BadRequest(message) => message.clone(),
            Self::Upload(error) => format!("Failed to read upload: {}", error.body_text()),
            Self::Pipeline(error) => error.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        Self::Pipeline(inner)
    }
}
