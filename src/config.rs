use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

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

/// Runtime configuration for the summarization server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Remote service used to generate summaries.
    pub summarization_provider: SummarizationProvider,
    /// Credential for the Gemini API; required when the provider is Gemini.
    pub gemini_api_key: Option<String>,
    /// Base URL of the Gemini REST API.
    pub gemini_url: String,
    /// Base URL of the Ollama runtime.
    pub ollama_url: String,
    /// Model identifier passed to the provider.
    pub summarization_model: String,
    /// Upper bound for one summarization round trip.
    pub summarization_timeout: Duration,
    /// Executable invoked for optical character recognition.
    pub ocr_command: String,
    /// Single language code handed to the OCR engine.
    pub ocr_language: String,
    /// Upper bound for PDF parsing and OCR runs.
    pub extraction_timeout: Duration,
    /// Maximum accepted multipart body size in bytes.
    pub max_upload_bytes: usize,
    /// Origin allowed by CORS; any origin when unset.
    pub frontend_url: Option<String>,
}

/// Supported summarization backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummarizationProvider {
    /// Hosted Gemini `generateContent` API.
    Gemini,
    /// Local Ollama runtime.
    Ollama,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let summarization_provider = match load_env_optional("SUMMARIZATION_PROVIDER") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("SUMMARIZATION_PROVIDER".into()))?,
            None => SummarizationProvider::Gemini,
        };
        let gemini_api_key = load_env_optional("GEMINI_API_KEY");
        if summarization_provider == SummarizationProvider::Gemini && gemini_api_key.is_none() {
            return Err(ConfigError::MissingVariable("GEMINI_API_KEY".into()));
        }
        let summarization_model = load_env_optional("SUMMARIZATION_MODEL").unwrap_or_else(|| {
            match summarization_provider {
                SummarizationProvider::Gemini => DEFAULT_GEMINI_MODEL.to_string(),
                SummarizationProvider::Ollama => DEFAULT_OLLAMA_MODEL.to_string(),
            }
        });

        Ok(Self {
            server_port: parse_optional("SERVER_PORT")?,
            summarization_provider,
            gemini_api_key,
            gemini_url: load_env_optional("GEMINI_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string()),
            ollama_url: load_env_optional("OLLAMA_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            summarization_model,
            summarization_timeout: Duration::from_secs(
                parse_optional("SUMMARIZATION_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            ocr_command: load_env_optional("OCR_COMMAND").unwrap_or_else(|| "tesseract".into()),
            ocr_language: load_env_optional("OCR_LANGUAGE").unwrap_or_else(|| "eng".into()),
            extraction_timeout: Duration::from_secs(
                parse_optional("EXTRACTION_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            max_upload_bytes: parse_optional("MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            frontend_url: load_env_optional("FRONTEND_URL"),
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for SummarizationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        server_port = ?config.server_port,
        provider = ?config.summarization_provider,
        model = %config.summarization_model,
        ocr_command = %config.ocr_command,
        ocr_language = %config.ocr_language,
        max_upload_bytes = config.max_upload_bytes,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        server_port: None,
        summarization_provider: SummarizationProvider::Gemini,
        gemini_api_key: Some("test-key".into()),
        gemini_url: DEFAULT_GEMINI_URL.into(),
        ollama_url: DEFAULT_OLLAMA_URL.into(),
        summarization_model: DEFAULT_GEMINI_MODEL.into(),
        summarization_timeout: Duration::from_secs(5),
        ocr_command: "tesseract".into(),
        ocr_language: "eng".into(),
        extraction_timeout: Duration::from_secs(5),
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        frontend_url: None,
    }
}
