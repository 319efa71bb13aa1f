//! PDF text-layer extraction backed by `lopdf`.

use super::{ExtractedText, ExtractionError, TextExtractor};
use async_trait::async_trait;
use lopdf::Document;
use std::time::Duration;

const ENGINE: &str = "pdf";

/// Reads the embedded text layer of a PDF, page by page.
///
/// Scanned documents without a text layer produce empty content rather than an error.
pub struct PdfExtractor {
    timeout: Duration,
}

impl PdfExtractor {
    /// Create an extractor that aborts parsing after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn extract_pages(bytes: &[u8]) -> Result<Vec<Vec<String>>, ExtractionError> {
        let document = Document::load_mem(bytes).map_err(|error| ExtractionError::Failed {
            engine: ENGINE,
            reason: format!("failed to parse PDF: {error}"),
        })?;

        // `get_pages` is keyed by page number, so iteration follows document order.
        let pages = document.get_pages();
        assemble_pages(
            pages
                .keys()
                .map(|page_number| (*page_number, document.extract_text(&[*page_number]))),
        )
    }
}

/// Collect per-page fragments in order.
///
/// A page lopdf cannot decode contributes an empty segment. When every page fails the document
/// is reported as a failure instead of as a text-free scan.
fn assemble_pages<E: std::fmt::Display>(
    pages: impl IntoIterator<Item = (u32, Result<String, E>)>,
) -> Result<Vec<Vec<String>>, ExtractionError> {
    let mut fragments = Vec::new();
    let mut last_error = None;
    let mut failed = 0usize;
    for (page_number, page_text) in pages {
        match page_text {
            Ok(text) => fragments.push(page_fragments(&text)),
            Err(error) => {
                tracing::warn!(page_number, %error, "Page text could not be decoded");
                failed += 1;
                last_error = Some(format!("page {page_number}: {error}"));
                fragments.push(Vec::new());
            }
        }
    }

    match last_error {
        Some(reason) if failed == fragments.len() => Err(ExtractionError::Failed {
            engine: ENGINE,
            reason: format!("no page could be decoded ({reason})"),
        }),
        _ => Ok(fragments),
    }
}

/// Split lopdf's per-page output into its text-object fragments, keeping stream order.
fn page_fragments(page_text: &str) -> Vec<String> {
    page_text
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join fragments with a space and terminate every page with a newline.
fn join_pages(pages: &[Vec<String>]) -> String {
    let mut text = String::new();
    for fragments in pages {
        text.push_str(&fragments.join(" "));
        text.push('\n');
    }
    text
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    #[tracing::instrument(skip_all, fields(bytes = bytes.len()))]
    async fn extract(&self, bytes: Vec<u8>) -> Result<ExtractedText, ExtractionError> {
        let pages = tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || Self::extract_pages(&bytes)),
        )
        .await
        .map_err(|_| ExtractionError::TimedOut {
            engine: ENGINE,
            after: self.timeout,
        })?
        .map_err(|error| ExtractionError::Aborted {
            engine: ENGINE,
            reason: error.to_string(),
        })??;

        let page_count = pages.len();
        let content = join_pages(&pages);
        tracing::info!(page_count, chars = content.len(), "PDF text extraction complete");

        Ok(ExtractedText {
            content,
            source_page_count: Some(page_count),
        })
    }
}
