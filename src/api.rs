//! HTTP surface for docsum.
//!
//! - `POST /api/upload` – Multipart upload with a `file` field and an optional `length` field
//!   (`short` | `medium` | `long`). Returns `{ "summary", "segments", "textPreview",
//!   "filename", "pageCount" }`.
//! - `GET /metrics` – Pipeline counters.
//! - `GET /` – Liveness message.
//!
//! Failures are answered with `{ "error": <message>, "code": <kind> }`: status 400 for problems
//! with the upload itself, 500 for extraction-engine or provider faults. Causes are logged, never
//! returned.

use crate::metrics::MetricsSnapshot;
use crate::processing::{
    LengthSelector, ProcessingApi, ProcessingError, SummaryResult, SummarySegment, UploadedFile,
};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Build the HTTP router exposing the upload endpoint.
pub fn create_router<S>(service: Arc<S>, max_upload_bytes: usize) -> Router
where
    S: ProcessingApi + 'static,
{
    Router::new()
        .route("/", get(root))
        .route("/api/upload", post(upload_document::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(service)
}

/// CORS policy admitting `frontend_url`, or any origin when none is configured.
pub fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let origin = match frontend_url.map(HeaderValue::from_str) {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(error)) => {
            tracing::warn!(%error, "Ignoring unparsable FRONTEND_URL; allowing any origin");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> &'static str {
    "docsum is running"
}

/// Success response for `POST /api/upload`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    /// Provider output including `**` emphasis markup; untrusted.
    summary: String,
    segments: Vec<SummarySegment>,
    text_preview: String,
    filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_count: Option<usize>,
}

impl From<SummaryResult> for UploadResponse {
    fn from(result: SummaryResult) -> Self {
        Self {
            summary: result.summary_text,
            segments: result.segments,
            text_preview: result.preview_text,
            filename: result.source_filename,
            page_count: result.source_page_count,
        }
    }
}

/// Summarize an uploaded document.
///
/// A `file` part sent without a filename and without content (a form submitted with no file
/// chosen) counts as no file. Unknown parts are ignored.
async fn upload_document<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError>
where
    S: ProcessingApi,
{
    let mut file = None;
    let mut length = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let media_type = field
                    .content_type()
                    .unwrap_or(FALLBACK_MEDIA_TYPE)
                    .to_string();
                let bytes = field.bytes().await?;
                if original_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                file = Some(UploadedFile {
                    bytes: bytes.to_vec(),
                    media_type,
                    original_name,
                });
            }
            Some("length") => length = Some(field.text().await?),
            other => tracing::debug!(field = ?other, "Ignoring unknown multipart field"),
        }
    }

    let length = LengthSelector::resolve(length.as_deref());
    let result = service.summarize_upload(file, length).await?;
    Ok(Json(result.into()))
}

/// Return the pipeline counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: ProcessingApi,
{
    Json(service.metrics_snapshot())
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    code: &'static str,
}

enum AppError {
    Processing(ProcessingError),
    Upload(MultipartError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Processing(error) => {
                let status = if error.is_client_error() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (
                    status,
                    ErrorBody {
                        error: error.public_message(),
                        code: error.code(),
                    },
                )
            }
            Self::Upload(error) => {
                tracing::warn!(error = %error, "Malformed upload");
                (
                    error.status(),
                    ErrorBody {
                        error: "Invalid upload payload",
                        code: "invalid_upload",
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<ProcessingError> for AppError {
    fn from(inner: ProcessingError) -> Self {
        Self::Processing(inner)
    }
}

impl From<MultipartError> for AppError {
    fn from(inner: MultipartError) -> Self {
        Self::Upload(inner)
    }
}
