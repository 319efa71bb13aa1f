//! Summary service coordinating extraction, prompt construction, and summarization.

use crate::{
    config::Config,
    extraction::ExtractionDispatcher,
    metrics::{MetricsSnapshot, PipelineMetrics},
    processing::{
        markup::parse_highlights,
        prompt::{LengthSelector, build_prompt},
        types::{PREVIEW_CHAR_LIMIT, ProcessingError, SummaryResult, UploadedFile, preview_prefix},
    },
    summarization::{SummarizationClient, SummarizationClientError, build_summarization_client},
};
use async_trait::async_trait;
use std::error::Error as _;
use std::sync::Arc;
use tracing::field::Empty;
use uuid::Uuid;

/// Runs the document-to-summary pipeline.
///
/// The service owns the extraction strategies, the summarization client, and the metrics
/// registry. Construct it once at startup and share it through an `Arc`; runs keep no state
/// beyond the counters, so concurrent uploads are independent.
pub struct SummaryService {
    extractor: ExtractionDispatcher,
    summarizer: Arc<dyn SummarizationClient>,
    metrics: Arc<PipelineMetrics>,
}

/// Abstraction over the pipeline used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait ProcessingApi: Send + Sync {
    /// Extract, validate, and summarize one upload.
    async fn summarize_upload(
        &self,
        file: Option<UploadedFile>,
        length: LengthSelector,
    ) -> Result<SummaryResult, ProcessingError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl SummaryService {
    /// Assemble a service from explicit components.
    pub fn new(extractor: ExtractionDispatcher, summarizer: Arc<dyn SummarizationClient>) -> Self {
        Self {
            extractor,
            summarizer,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Build the extraction strategies and summarization client described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, SummarizationClientError> {
        let summarizer = build_summarization_client(config)?;
        Ok(Self::new(ExtractionDispatcher::from_config(config), summarizer))
    }

    /// Extract, validate, and summarize one upload.
    ///
    /// Whitespace-only extractions are rejected before the provider is called. Dropping the
    /// returned future (for instance when the HTTP client disconnects) stops the run at its
    /// next await point, so no provider call is made for a departed caller.
    #[tracing::instrument(
        skip_all,
        fields(request_id = %Uuid::new_v4(), length = %length, filename = Empty, media_type = Empty)
    )]
    pub async fn summarize_upload(
        &self,
        file: Option<UploadedFile>,
        length: LengthSelector,
    ) -> Result<SummaryResult, ProcessingError> {
        let outcome = self.run(file, length).await;
        match &outcome {
            Ok(result) => {
                self.metrics.record_summary();
                tracing::info!(
                    summary_chars = result.summary_text.len(),
                    highlights = result.segments.len(),
                    "Summary produced"
                );
            }
            Err(error) => self.record_failure(error),
        }
        outcome
    }

    async fn run(
        &self,
        file: Option<UploadedFile>,
        length: LengthSelector,
    ) -> Result<SummaryResult, ProcessingError> {
        let UploadedFile {
            bytes,
            media_type,
            original_name,
        } = file.ok_or(ProcessingError::NoFileProvided)?;

        let span = tracing::Span::current();
        span.record("filename", original_name.as_str());
        span.record("media_type", media_type.as_str());
        tracing::info!(bytes = bytes.len(), "Processing upload");

        let extracted = self.extractor.extract(&media_type, bytes).await?;
        if extracted.is_blank() {
            return Err(ProcessingError::EmptyExtraction);
        }
        tracing::debug!(
            chars = extracted.content.len(),
            pages = ?extracted.source_page_count,
            "Text extracted"
        );

        let prompt = build_prompt(&extracted.content, length);
        let summary_text = self.summarizer.generate_summary(&prompt).await?;
        let segments = parse_highlights(&summary_text);

        Ok(SummaryResult {
            segments,
            summary_text,
            preview_text: preview_prefix(&extracted.content, PREVIEW_CHAR_LIMIT).to_string(),
            source_filename: original_name,
            source_page_count: extracted.source_page_count,
        })
    }

    fn record_failure(&self, error: &ProcessingError) {
        let cause = error.source().map(ToString::to_string);
        match error {
            ProcessingError::ExtractionFailed(_) => self.metrics.record_extraction_failure(),
            ProcessingError::SummarizationFailed(_) => self.metrics.record_summarization_failure(),
            _ if error.is_client_error() => self.metrics.record_rejection(),
            _ => {}
        }
        if error.is_client_error() {
            tracing::warn!(code = error.code(), error = %error, "Upload rejected");
        } else {
            tracing::error!(code = error.code(), error = %error, cause = ?cause, "Upload failed");
        }
    }

    /// Return the current pipeline metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl ProcessingApi for SummaryService {
    async fn summarize_upload(
        &self,
        file: Option<UploadedFile>,
        length: LengthSelector,
    ) -> Result<SummaryResult, ProcessingError> {
        SummaryService::summarize_upload(self, file, length).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        SummaryService::metrics_snapshot(self)
    }
}
