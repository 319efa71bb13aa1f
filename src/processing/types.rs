//! Core data types and error definitions for the summarization pipeline.

use super::markup::SummarySegment;
use crate::extraction::ExtractionError;
use crate::summarization::SummarizationClientError;
use thiserror::Error;

/// Maximum number of characters copied into [`SummaryResult::preview_text`].
pub const PREVIEW_CHAR_LIMIT: usize = 1000;

/// Document received from a caller, held in memory for one pipeline run.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Raw document contents.
    pub bytes: Vec<u8>,
    /// Declared media type, e.g. `application/pdf` or `image/png`.
    pub media_type: String,
    /// Filename supplied by the client.
    pub original_name: String,
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    /// Summary exactly as returned by the provider, including emphasis markup.
    pub summary_text: String,
    /// Structured split of `summary_text` into plain and highlighted segments.
    pub segments: Vec<SummarySegment>,
    /// Literal prefix of the extracted text.
    pub preview_text: String,
    /// Filename supplied with the upload.
    pub source_filename: String,
    /// Page count of the source document, when it has pages.
    pub source_page_count: Option<usize>,
}

/// Errors emitted by the summarization pipeline.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The request carried no file.
    #[error("No file uploaded")]
    NoFileProvided,
    /// The file's media type has no extraction strategy.
    #[error("Unsupported file type: {0}")]
    UnsupportedMediaType(String),
    /// The PDF parser or OCR engine failed.
    #[error("Failed to extract text: {0}")]
    ExtractionFailed(#[source] ExtractionError),
    /// Extraction succeeded but found no usable text.
    #[error("Could not extract text from file")]
    EmptyExtraction,
    /// The summarization provider call failed.
    #[error("Summarization failed: {0}")]
    SummarizationFailed(#[from] SummarizationClientError),
    /// Any other fault.
    #[error("Processing error: {0}")]
    Internal(String),
}

impl ProcessingError {
    /// Stable machine-readable identifier for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoFileProvided => "no_file_provided",
            Self::UnsupportedMediaType(_) => "unsupported_media_type",
            Self::ExtractionFailed(_) => "extraction_failed",
            Self::EmptyExtraction => "empty_extraction",
            Self::SummarizationFailed(_) => "summarization_failed",
            Self::Internal(_) => "processing_error",
        }
    }

    /// Short message safe to show to callers; causes stay in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::NoFileProvided => "No file uploaded",
            Self::UnsupportedMediaType(_) => "Unsupported file type",
            Self::ExtractionFailed(_) => "Failed to extract text from file",
            Self::EmptyExtraction => "Could not extract text from file",
            Self::SummarizationFailed(_) => "Failed to generate summary",
            Self::Internal(_) => "Processing error",
        }
    }

    /// Whether the failure was caused by the caller's input rather than a backend fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NoFileProvided | Self::UnsupportedMediaType(_) | Self::EmptyExtraction
        )
    }
}

impl From<ExtractionError> for ProcessingError {
    fn from(error: ExtractionError) -> Self {
        match error {
            ExtractionError::UnsupportedMediaType(media_type) => {
                Self::UnsupportedMediaType(media_type)
            }
            aborted @ ExtractionError::Aborted { .. } => Self::Internal(aborted.to_string()),
            other => Self::ExtractionFailed(other),
        }
    }
}

/// Longest prefix of `text` holding at most `limit` characters.
pub fn preview_prefix(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
