//! Clients for the remote generative-text services that write summaries.
//!
//! A client is constructed once at startup from [`Config`] and shared by every pipeline run.
//! Each run issues exactly one request; failures are reported to the caller and never retried
//! here.

mod gemini;
mod ollama;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

use crate::config::{Config, SummarizationProvider};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced while requesting a summary.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider could not be reached or was misconfigured.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Send the prompt and return the generated text verbatim.
    async fn generate_summary(&self, prompt: &str) -> Result<String, SummarizationClientError>;
}

/// Build the client selected by configuration.
pub fn build_summarization_client(
    config: &Config,
) -> Result<Arc<dyn SummarizationClient>, SummarizationClientError> {
    let http = http_client(config.summarization_timeout)?;
    let client: Arc<dyn SummarizationClient> = match config.summarization_provider {
        SummarizationProvider::Gemini => {
            let api_key = config.gemini_api_key.clone().ok_or_else(|| {
                SummarizationClientError::ProviderUnavailable("GEMINI_API_KEY is not set".into())
            })?;
            Arc::new(GeminiClient::new(
                http,
                config.gemini_url.clone(),
                api_key,
                config.summarization_model.clone(),
            ))
        }
        SummarizationProvider::Ollama => Arc::new(OllamaClient::new(
            http,
            config.ollama_url.clone(),
            config.summarization_model.clone(),
        )),
    };
    tracing::info!(
        provider = ?config.summarization_provider,
        model = %config.summarization_model,
        timeout = ?config.summarization_timeout,
        "Summarization client initialized"
    );
    Ok(client)
}

fn http_client(timeout: Duration) -> Result<Client, SummarizationClientError> {
    Client::builder()
        .user_agent("docsum/summary")
        .timeout(timeout)
        .build()
        .map_err(|error| {
            SummarizationClientError::ProviderUnavailable(format!(
                "failed to construct HTTP client: {error}"
            ))
        })
}
