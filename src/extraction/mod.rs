//! Text acquisition for submitted files.
//!
//! Routing trusts the declared media type: `application/pdf` goes to the page-structured
//! document parser, `image/*` goes through a single OCR pass, and everything else (including a
//! missing type) is decoded as plain text. Files with wrong type metadata are routed wrongly
//! and usually produce empty or garbled text rather than an error.

pub mod ocr;
pub mod pdf;

use crate::config::Config;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

pub use ocr::{OCR_LANGUAGE, OcrEngine, TesseractOcr};
pub use pdf::{DocumentParser, LopdfParser, PagedDocument, join_pages};

/// Media type routed to the structured-document strategy.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";
/// Media type prefix routed to the OCR strategy.
pub const IMAGE_MEDIA_PREFIX: &str = "image/";

/// Errors raised when an extraction engine cannot process a file.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    /// The structured document could not be opened or a page could not be read.
    #[error("Failed to read document: {0}")]
    Document(String),
    /// The OCR engine ran but reported a failure.
    #[error("Text recognition failed: {0}")]
    Ocr(String),
    /// The extraction engine is not installed or could not be started.
    #[error("Extraction engine unavailable: {0}")]
    EngineUnavailable(String),
}

/// User-provided file content plus the metadata reported alongside it.
#[derive(Debug, Clone)]
pub struct SubmittedFile {
    bytes: Vec<u8>,
    media_type: Option<String>,
    name: String,
}

impl SubmittedFile {
    /// Wrap uploaded bytes. Blank media types are treated as absent.
    pub fn new(name: impl Into<String>, media_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            media_type: media_type.filter(|value| !value.trim().is_empty()),
            name: name.into(),
        }
    }

    /// Raw file content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Declared media type, if any.
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    /// Display name reported by the uploader.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte length of the content.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Text-acquisition strategy chosen for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Per-page text extraction from a paginated document.
    StructuredDocument,
    /// Optical character recognition over image pixels.
    Ocr,
    /// Bytes decoded as text verbatim.
    RawText,
}

/// Pick the strategy for a declared media type. Every input maps to exactly one strategy.
pub fn select_strategy(media_type: Option<&str>) -> ExtractionStrategy {
    match media_type {
        Some(PDF_MEDIA_TYPE) => ExtractionStrategy::StructuredDocument,
        Some(value) if value.starts_with(IMAGE_MEDIA_PREFIX) => ExtractionStrategy::Ocr,
        _ => ExtractionStrategy::RawText,
    }
}

/// Decode bytes as UTF-8 text, substituting replacement characters for invalid sequences.
pub fn decode_raw_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Dispatches submitted files to the document parser, the OCR engine, or raw decoding.
pub struct TextExtractor {
    parser: Arc<dyn DocumentParser>,
    ocr: Box<dyn OcrEngine>,
}

impl TextExtractor {
    /// Build an extractor from explicit collaborators.
    pub fn new(parser: Box<dyn DocumentParser>, ocr: Box<dyn OcrEngine>) -> Self {
        Self {
            parser: Arc::from(parser),
            ocr,
        }
    }

    /// Build the default extractor: `lopdf` for documents and tesseract for images.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(LopdfParser),
            Box::new(TesseractOcr::new(config.tesseract_bin.clone())),
        )
    }

    /// Recover all text from a file using the strategy its media type selects.
    pub async fn extract_text(&self, file: &SubmittedFile) -> Result<String, ExtractionError> {
        self.extract_with(select_strategy(file.media_type()), file)
            .await
    }

    /// Recover all text from a file using an already selected strategy.
    pub async fn extract_with(
        &self,
        strategy: ExtractionStrategy,
        file: &SubmittedFile,
    ) -> Result<String, ExtractionError> {
        tracing::debug!(
            file = file.name(),
            size = file.size(),
            media_type = ?file.media_type(),
            ?strategy,
            "Extracting text"
        );
        let text = match strategy {
            ExtractionStrategy::StructuredDocument => self.parse_document(file).await?,
            ExtractionStrategy::Ocr => {
                self.ocr
                    .recognize(file.bytes(), file.media_type(), OCR_LANGUAGE)
                    .await?
            }
            ExtractionStrategy::RawText => decode_raw_text(file.bytes()),
        };
        tracing::debug!(file = file.name(), chars = text.chars().count(), "Text extracted");
        Ok(text)
    }

    /// Parsing is CPU-bound, so it runs on the blocking pool.
    async fn parse_document(&self, file: &SubmittedFile) -> Result<String, ExtractionError> {
        let parser = Arc::clone(&self.parser);
        let bytes = file.bytes().to_vec();
        tokio::task::spawn_blocking(move || {
            let document = parser.open(&bytes)?;
            join_pages(document.as_ref())
        })
        .await
        .map_err(|err| ExtractionError::Document(format!("document task failed: {err}")))?
    }
}
