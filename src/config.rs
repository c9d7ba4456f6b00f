use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Environment variable holding the model credential.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TESSERACT_BIN: &str = "tesseract";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the summarization pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Credential for the hosted model. Absence is only reported when a summary is requested.
    pub gemini_api_key: Option<String>,
    /// Model identifier used in the `generateContent` path.
    pub gemini_model: String,
    /// Base URL of the model provider.
    pub gemini_base_url: String,
    /// Path or name of the tesseract executable used for OCR.
    pub tesseract_bin: String,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Upper bound on accepted upload bodies.
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();
        Ok(Self {
            gemini_api_key: get(API_KEY_VAR),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: get("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gemini_base_url),
            tesseract_bin: get("TESSERACT_BIN").unwrap_or(defaults.tesseract_bin),
            server_port: parse_optional("SERVER_PORT", get("SERVER_PORT"))?,
            max_upload_bytes: parse_optional("MAX_UPLOAD_BYTES", get("MAX_UPLOAD_BYTES"))?
                .unwrap_or(defaults.max_upload_bytes),
        })
    }
}

impl Config {
    /// Emit the loaded settings at debug level. The credential is reported only as present or
    /// absent.
    pub fn log_loaded(&self) {
        tracing::debug!(
            model = %self.gemini_model,
            base_url = %self.gemini_base_url,
            api_key_present = self.gemini_api_key.is_some(),
            tesseract = %self.tesseract_bin,
            server_port = ?self.server_port,
            max_upload_bytes = self.max_upload_bytes,
            "Loaded configuration"
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            tesseract_bin: DEFAULT_TESSERACT_BIN.to_string(),
            server_port: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn parse_optional<T: FromStr>(key: &str, value: Option<String>) -> Result<Option<T>, ConfigError> {
    value
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load `.env` and the process environment into the global cache.
///
/// Runs before tracing is installed so `.env` can supply `RUST_LOG`; call
/// [`Config::log_loaded`] once a subscriber exists.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    CONFIG.set(config).expect("Failed to set config");
}
