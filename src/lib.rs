#![deny(missing_docs)]

//! Core library for the docsum document summarization service.

/// HTTP routing and upload handling.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// PDF and OCR text extraction strategies.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Pipeline outcome counters.
pub mod metrics;
/// Document-to-summary pipeline.
pub mod processing;
/// Remote summarization provider clients.
pub mod summarization;
