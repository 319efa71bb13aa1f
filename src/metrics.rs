use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing pipeline outcomes.
#[derive(Default)]
pub struct PipelineMetrics {
    summaries_completed: AtomicU64,
    uploads_rejected: AtomicU64,
    extraction_failures: AtomicU64,
    summarization_failures: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pipeline run that produced a summary.
    pub fn record_summary(&self) {
        self.summaries_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an upload refused because of the caller's input.
    pub fn record_rejection(&self) {
        self.uploads_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a fault raised by the PDF parser or OCR engine.
    pub fn record_extraction_failure(&self) {
        self.extraction_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a fault raised by the summarization provider.
    pub fn record_summarization_failure(&self) {
        self.summarization_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            summaries_completed: self.summaries_completed.load(Ordering::Relaxed),
            uploads_rejected: self.uploads_rejected.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            summarization_failures: self.summarization_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of pipeline counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Uploads that produced a summary since startup.
    pub summaries_completed: u64,
    /// Uploads refused with a client error (missing file, bad type, no text).
    pub uploads_rejected: u64,
    /// Uploads that failed inside the PDF parser or OCR engine.
    pub extraction_failures: u64,
    /// Uploads whose summarization call failed.
    pub summarization_failures: u64,
}
