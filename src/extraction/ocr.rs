//! Optical character recognition through the `tesseract` command-line engine.

use super::ExtractionError;
use async_trait::async_trait;
use std::io::Write;
use std::process::Stdio;
use tokio::process::Command;

/// Recognition language passed to every OCR pass.
pub const OCR_LANGUAGE: &str = "eng";

/// Engine that turns image bytes into text in a single best-effort pass.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize text in the image. An image without text yields an empty string.
    async fn recognize(
        &self,
        bytes: &[u8],
        media_type: Option<&str>,
        language: &str,
    ) -> Result<String, ExtractionError>;
}

/// [`OcrEngine`] that shells out to a local tesseract binary.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: String,
}

impl TesseractOcr {
    /// Use the given executable name or path.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(
        &self,
        bytes: &[u8],
        media_type: Option<&str>,
        language: &str,
    ) -> Result<String, ExtractionError> {
        let suffix = suffix_for_media_type(media_type);
        let owned = bytes.to_vec();
        let input = tokio::task::spawn_blocking(move || write_temp_image(&owned, suffix))
            .await
            .map_err(|err| ExtractionError::Ocr(format!("temp file task failed: {err}")))??;

        // tesseract <image> stdout -l <lang>
        let output = Command::new(&self.binary)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    ExtractionError::EngineUnavailable(format!("{} not found", self.binary))
                } else {
                    ExtractionError::EngineUnavailable(format!(
                        "failed to start {}: {err}",
                        self.binary
                    ))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Ocr(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!(language, chars = text.chars().count(), "OCR pass complete");
        Ok(text)
    }
}

fn write_temp_image(
    bytes: &[u8],
    suffix: &str,
) -> Result<tempfile::NamedTempFile, ExtractionError> {
    let mut file = tempfile::Builder::new()
        .prefix("docsum-ocr-")
        .suffix(suffix)
        .tempfile()
        .map_err(|err| ExtractionError::Ocr(format!("failed to create temp file: {err}")))?;
    file.write_all(bytes)
        .and_then(|()| file.flush())
        .map_err(|err| ExtractionError::Ocr(format!("failed to write temp file: {err}")))?;
    Ok(file)
}

fn suffix_for_media_type(media_type: Option<&str>) -> &'static str {
    match media_type {
        Some("image/png") => ".png",
        Some("image/jpeg") | Some("image/jpg") => ".jpg",
        Some("image/gif") => ".gif",
        Some("image/bmp") => ".bmp",
        Some("image/tiff") => ".tif",
        Some("image/webp") => ".webp",
        _ => ".img",
    }
}
