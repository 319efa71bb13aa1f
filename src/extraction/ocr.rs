//! Optical character recognition through a `tesseract` child process.
//!
//! Every call spawns its own engine process, so concurrent uploads never share a session.
//! Image bytes are streamed over stdin and the recognized text is read from stdout; nothing
//! touches the filesystem.

use super::{ExtractedText, ExtractionError, TextExtractor};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const ENGINE: &str = "ocr";

/// Runs a single-language OCR engine against raw image bytes.
pub struct OcrExtractor {
    command: String,
    language: String,
    timeout: Duration,
}

impl OcrExtractor {
    /// Create an extractor invoking `command` with the given language code.
    pub fn new(command: String, language: String, timeout: Duration) -> Self {
        Self {
            command,
            language,
            timeout,
        }
    }

    fn engine_command(&self) -> Command {
        let mut command = Command::new(&self.command);
        command
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    async fn recognize(&self, bytes: Vec<u8>) -> Result<String, ExtractionError> {
        let mut child = self
            .engine_command()
            .spawn()
            .map_err(|error| failure(format!("failed to start {}: {error}", self.command)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| failure("engine stdin unavailable".into()))?;
        let writer = tokio::spawn(async move {
            stdin.write_all(&bytes).await?;
            stdin.shutdown().await
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|error| failure(format!("failed to collect engine output: {error}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failure(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                return Err(failure(format!("failed to stream image to engine: {error}")));
            }
            Err(error) => {
                return Err(ExtractionError::Aborted {
                    engine: ENGINE,
                    reason: format!("stdin writer: {error}"),
                });
            }
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn failure(reason: String) -> ExtractionError {
    ExtractionError::Failed {
        engine: ENGINE,
        reason,
    }
}

#[async_trait]
impl TextExtractor for OcrExtractor {
    #[tracing::instrument(skip_all, fields(bytes = bytes.len(), language = %self.language))]
    async fn extract(&self, bytes: Vec<u8>) -> Result<ExtractedText, ExtractionError> {
        let content = tokio::time::timeout(self.timeout, self.recognize(bytes))
            .await
            .map_err(|_| ExtractionError::TimedOut {
                engine: ENGINE,
                after: self.timeout,
            })??;

        tracing::info!(chars = content.len(), "OCR extraction complete");
        Ok(ExtractedText {
            content,
            source_page_count: None,
        })
    }
}
