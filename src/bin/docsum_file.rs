//! Summarize a local PDF or image without starting the HTTP server.
//!
//! Uses the same environment configuration and pipeline as the `docsum` server and prints the
//! JSON body the upload endpoint would return.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use docsum::{
    config, logging,
    processing::{LengthSelector, SummaryService, UploadedFile},
};
use serde_json::json;

#[derive(Parser)]
#[command(
    name = "docsum-file",
    about = "Summarize a local PDF or image with the configured provider"
)]
struct Cli {
    /// Document to summarize.
    path: PathBuf,
    /// Summary length: short, medium, or long.
    #[arg(long, default_value = "medium")]
    length: LengthSelector,
    /// Media type override; inferred from the file extension when omitted.
    #[arg(long)]
    media_type: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    config::init_config();
    logging::init_tracing();

    let media_type = match cli.media_type {
        Some(media_type) => media_type,
        None => infer_media_type(&cli.path)?.to_string(),
    };
    let bytes = tokio::fs::read(&cli.path)
        .await
        .with_context(|| format!("failed to read {}", cli.path.display()))?;
    let original_name = cli
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let service = SummaryService::from_config(config::get_config())
        .context("failed to build summarization client")?;
    let result = service
        .summarize_upload(
            Some(UploadedFile {
                bytes,
                media_type,
                original_name,
            }),
            cli.length,
        )
        .await
        .context("summarization pipeline failed")?;

    let body = json!({
        "summary": result.summary_text,
        "segments": result.segments,
        "textPreview": result.preview_text,
        "filename": result.source_filename,
        "pageCount": result.source_page_count,
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn infer_media_type(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    Ok(match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        _ => bail!(
            "cannot infer media type of {}; pass --media-type",
            path.display()
        ),
    })
}
