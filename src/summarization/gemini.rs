use super::{SummarizationClient, SummarizationClientError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a client for `model` served from `base_url`.
    pub fn new(http: Client, base_url: String, api_key: String, model: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[async_trait]
impl SummarizationClient for GeminiClient {
    async fn generate_summary(&self, prompt: &str) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach Gemini at {}: {error}",
                    self.base_url
                ))
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SummarizationClientError::ProviderUnavailable(format!(
                "Gemini model {} not found",
                self.model
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "Gemini returned {status}: {body}"
            )));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode Gemini response: {error}"
            ))
        })?;

        if let Some(reason) = body.prompt_feedback.and_then(|feedback| feedback.block_reason) {
            return Err(SummarizationClientError::GenerationFailed(format!(
                "prompt blocked by Gemini: {reason}"
            )));
        }

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(SummarizationClientError::InvalidResponse(
                "Gemini response carried no text".into(),
            ));
        }

        tracing::debug!(model = %self.model, chars = text.len(), "Gemini summary received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    const PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new(
            Client::builder()
                .user_agent("docsum-test")
                .build()
                .expect("client"),
            server.base_url(),
            "secret".into(),
            "gemini-1.5-flash".into(),
        )
    }

    #[tokio::test]
    async fn returns_candidate_text_verbatim() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(PATH)
                    .header("x-goog-api-key", "secret")
                    .json_body_partial(r#"{"contents":[{"role":"user","parts":[{"text":"Summarize this"}]}]}"#);
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {
                            "parts": [
                                { "text": "The **report** covers " },
                                { "text": "**2024**.\n" }
                            ]
                        }
                    }]
                }));
            })
            .await;

        let summary = client(&server)
            .generate_summary("Summarize this")
            .await
            .expect("summary");

        mock.assert_async().await;
        assert_eq!(summary, "The **report** covers **2024**.\n");
    }

    #[tokio::test]
    async fn error_status_becomes_generation_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(429).body("quota exceeded");
            })
            .await;

        let error = client(&server)
            .generate_summary("prompt")
            .await
            .expect_err("quota error");
        assert!(
            matches!(error, SummarizationClientError::GenerationFailed(ref message) if message.contains("429"))
        );
    }

    #[tokio::test]
    async fn blocked_prompt_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(200).json_body(json!({
                    "promptFeedback": { "blockReason": "SAFETY" }
                }));
            })
            .await;

        let error = client(&server)
            .generate_summary("prompt")
            .await
            .expect_err("blocked");
        assert!(
            matches!(error, SummarizationClientError::GenerationFailed(ref message) if message.contains("SAFETY"))
        );
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(200).body("not json");
            })
            .await;

        let error = client(&server)
            .generate_summary("prompt")
            .await
            .expect_err("decode failure");
        assert!(matches!(error, SummarizationClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_provider_unavailable() {
        let client = GeminiClient::new(
            Client::new(),
            "http://127.0.0.1:1".into(),
            "secret".into(),
            "gemini-1.5-flash".into(),
        );
        let error = client
            .generate_summary("prompt")
            .await
            .expect_err("connection refused");
        assert!(matches!(error, SummarizationClientError::ProviderUnavailable(_)));
    }
}
