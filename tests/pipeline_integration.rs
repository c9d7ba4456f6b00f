use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use docsum::{
    api,
    extraction::{
        DocumentParser, ExtractionError, ExtractionStrategy, OcrEngine, PagedDocument,
        SubmittedFile, TextExtractor,
    },
    pipeline::{PipelineError, SummaryService},
    summarization::{GeminiClient, SummaryLength},
};
use httpmock::{Method::POST, Mock, MockServer};
use serde_json::json;
use tower::ServiceExt;

const MODEL: &str = "gemini-test";
const PATH: &str = "/v1beta/models/gemini-test:generateContent";

struct TwoPageDocument;

impl PagedDocument for TwoPageDocument {
    fn page_count(&self) -> u32 {
        2
    }

    fn page_fragments(&self, page: u32) -> Result<Vec<String>, ExtractionError> {
        Ok(match page {
            1 => vec!["Alpha".into(), "beta".into()],
            _ => vec!["Gamma".into()],
        })
    }
}

struct StubParser;

impl DocumentParser for StubParser {
    fn open(&self, _bytes: &[u8]) -> Result<Box<dyn PagedDocument>, ExtractionError> {
        Ok(Box::new(TwoPageDocument))
    }
}

struct StubOcr;

#[async_trait]
impl OcrEngine for StubOcr {
    async fn recognize(
        &self,
        _bytes: &[u8],
        _media_type: Option<&str>,
        _language: &str,
    ) -> Result<String, ExtractionError> {
        Ok("Invoice total 42 EUR".into())
    }
}

fn service(server: &MockServer, api_key: Option<&str>) -> SummaryService {
    let client = GeminiClient::new(server.base_url(), MODEL, api_key.map(str::to_string))
        .expect("gemini client");
    SummaryService::new(
        TextExtractor::new(Box::new(StubParser), Box::new(StubOcr)),
        Box::new(client),
    )
}

fn envelope(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
}

async fn mock_reply<'a>(server: &'a MockServer, text: &str) -> Mock<'a> {
    let body = envelope(text);
    server
        .mock_async(move |when, then| {
            when.method(POST).path(PATH).query_param("key", "test-key");
            then.status(200).json_body(body);
        })
        .await
}

#[tokio::test]
async fn pdf_pages_are_joined_in_order_before_summarizing() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .body_contains("Alpha beta\\n\\nGamma")
                .body_contains("150-250 words");
            then.status(200).json_body(envelope(
                "```json\n{\"summary\":\"Greek letters.\",\"key_points\":[\"alpha\",\"gamma\"]}\n```",
            ));
        })
        .await;

    let file = SubmittedFile::new("letters.pdf", Some("application/pdf".into()), b"%PDF".to_vec());
    let outcome = service(&server, Some("test-key"))
        .summarize(&file, SummaryLength::from_label(None))
        .await
        .expect("outcome");

    mock.assert_async().await;
    assert_eq!(outcome.strategy, ExtractionStrategy::StructuredDocument);
    assert_eq!(outcome.result.summary, "Greek letters.");
    assert_eq!(outcome.result.key_points, vec!["alpha", "gamma"]);
    assert!(!outcome.degraded);
}

#[tokio::test]
async fn images_are_summarized_from_ocr_text() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .body_contains("Invoice total 42 EUR")
                .body_contains("300-450 words");
            then.status(200)
                .json_body(envelope("Here you go: {\"summary\":\"An invoice.\",\"key_points\":[]}"));
        })
        .await;

    let file = SubmittedFile::new("invoice.png", Some("image/png".into()), vec![0x89, 0x50]);
    let outcome = service(&server, Some("test-key"))
        .summarize(&file, SummaryLength::Long)
        .await
        .expect("outcome");

    mock.assert_async().await;
    assert_eq!(outcome.strategy, ExtractionStrategy::Ocr);
    assert_eq!(outcome.result.summary, "An invoice.");
    assert!(outcome.result.key_points.is_empty());
}

#[tokio::test]
async fn whitespace_text_files_never_reach_the_model() {
    let server = MockServer::start_async().await;
    let mock = mock_reply(&server, "{}").await;

    let file = SubmittedFile::new("blank.txt", Some("text/plain".into()), b" \n\t ".to_vec());
    let error = service(&server, Some("test-key"))
        .summarize(&file, SummaryLength::Short)
        .await
        .expect_err("empty content");

    assert!(matches!(error, PipelineError::EmptyContent));
    assert_eq!(error.to_string(), "Could not extract any text from this file.");
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn missing_credential_fails_without_network_call() {
    let server = MockServer::start_async().await;
    let mock = mock_reply(&server, "{}").await;

    let file = SubmittedFile::new("notes.txt", None, b"Some notes".to_vec());
    let error = service(&server, None)
        .summarize(&file, SummaryLength::Medium)
        .await
        .expect_err("configuration error");

    assert!(matches!(error, PipelineError::Configuration(_)));
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn unparseable_reply_becomes_raw_summary() {
    let server = MockServer::start_async().await;
    let raw = r#"{"summary": invalid}"#;
    mock_reply(&server, raw).await;

    let file = SubmittedFile::new("notes.txt", Some("text/plain".into()), b"Some notes".to_vec());
    let outcome = service(&server, Some("test-key"))
        .summarize(&file, SummaryLength::Medium)
        .await
        .expect("outcome");

    assert!(outcome.degraded);
    assert_eq!(outcome.result.summary, raw);
    assert!(outcome.result.key_points.is_empty());
}

#[tokio::test]
async fn upload_through_router_returns_summary_json() {
    let server = MockServer::start_async().await;
    mock_reply(&server, r#"{"summary":"A","key_points":["x","y"]}"#).await;
    let app = api::create_router(Arc::new(service(&server, Some("test-key"))));

    let boundary = "integration-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\nContent-Type: text/plain\r\n\r\nQuarterly notes\r\n--{boundary}\r\nContent-Disposition: form-data; name=\"length\"\r\n\r\nshort\r\n--{boundary}--\r\n"
    );
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/summarize")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(json["summary"], "A");
    assert_eq!(json["key_points"], json!(["x", "y"]));
    assert_eq!(json["strategy"], "raw_text");
    assert_eq!(json["truncated"], false);
}
