//! Text extraction from uploaded documents.
//!
//! Two strategies share the [`TextExtractor`] seam: the PDF text layer ([`pdf::PdfExtractor`])
//! and optical character recognition for images ([`ocr::OcrExtractor`]). The
//! [`ExtractionDispatcher`] picks one by declared media type and refuses anything else before a
//! strategy is touched.

pub mod ocr;
pub mod pdf;

use crate::config::Config;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Media type routed to the PDF strategy.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Errors raised while turning uploaded bytes into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Declared media type has no extraction strategy.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
    /// The PDF parser or OCR engine reported a fault.
    #[error("{engine} extraction failed: {reason}")]
    Failed {
        /// Engine that failed (`pdf` or `ocr`).
        engine: &'static str,
        /// Engine-provided diagnostic.
        reason: String,
    },
    /// The task driving the engine panicked or was cancelled by the runtime.
    #[error("{engine} extraction task aborted: {reason}")]
    Aborted {
        /// Engine whose task was lost.
        engine: &'static str,
        /// Runtime diagnostic.
        reason: String,
    },
    /// The engine did not finish within the configured budget.
    #[error("{engine} extraction timed out after {after:?}")]
    TimedOut {
        /// Engine that was aborted.
        engine: &'static str,
        /// Budget that elapsed.
        after: Duration,
    },
}

/// Text recovered from one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Recovered text; may be empty when the document carries no glyphs.
    pub content: String,
    /// Number of pages in the source, when the format has pages.
    pub source_page_count: Option<usize>,
}

impl ExtractedText {
    /// Whether the text is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Extraction strategy selected for a media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// `application/pdf`.
    Pdf,
    /// Any `image/*` type.
    Image,
}

impl MediaKind {
    /// Classify a declared media type, ignoring case and parameters such as `; charset=`.
    pub fn classify(media_type: &str) -> Option<Self> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == PDF_MEDIA_TYPE {
            Some(Self::Pdf)
        } else if essence
            .strip_prefix("image/")
            .is_some_and(|subtype| !subtype.is_empty())
        {
            Some(Self::Image)
        } else {
            None
        }
    }
}

/// Interface implemented by extraction strategies.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Recover text from the raw document bytes.
    async fn extract(&self, bytes: Vec<u8>) -> Result<ExtractedText, ExtractionError>;
}

/// Routes uploads to the PDF or OCR strategy.
pub struct ExtractionDispatcher {
    pdf: Box<dyn TextExtractor>,
    ocr: Box<dyn TextExtractor>,
}

impl ExtractionDispatcher {
    /// Assemble a dispatcher from explicit strategies.
    pub fn new(pdf: Box<dyn TextExtractor>, ocr: Box<dyn TextExtractor>) -> Self {
        Self { pdf, ocr }
    }

    /// Build the lopdf and tesseract strategies described by the configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(pdf::PdfExtractor::new(config.extraction_timeout)),
            Box::new(ocr::OcrExtractor::new(
                config.ocr_command.clone(),
                config.ocr_language.clone(),
                config.extraction_timeout,
            )),
        )
    }

    /// Extract text with the strategy matching `media_type`.
    pub async fn extract(
        &self,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<ExtractedText, ExtractionError> {
        let kind = MediaKind::classify(media_type)
            .ok_or_else(|| ExtractionError::UnsupportedMediaType(media_type.to_string()))?;
        tracing::debug!(?kind, media_type, bytes = bytes.len(), "Dispatching extraction");
        match kind {
            MediaKind::Pdf => self.pdf.extract(bytes).await,
            MediaKind::Image => self.ocr.extract(bytes).await,
        }
    }
}
