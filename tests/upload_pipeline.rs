//! Drives real PDFs through the HTTP surface against a mocked Gemini endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use docsum::{
    api,
    config::{Config, SummarizationProvider},
    extraction::{ExtractionDispatcher, TextExtractor, pdf::PdfExtractor},
    processing::{LengthSelector, SummaryService, build_prompt},
};
use httpmock::{Method::POST, MockServer};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "docsum-integration";
const GEMINI_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

/// Build a PDF whose pages each draw one Helvetica string; an empty string draws nothing.
fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            Vec::new()
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize pdf");
    bytes
}

fn config_for(server: &MockServer) -> Config {
    Config {
        server_port: None,
        summarization_provider: SummarizationProvider::Gemini,
        gemini_api_key: Some("integration-key".into()),
        gemini_url: server.base_url(),
        ollama_url: "http://127.0.0.1:11434".into(),
        summarization_model: "gemini-1.5-flash".into(),
        summarization_timeout: Duration::from_secs(5),
        ocr_command: "tesseract".into(),
        ocr_language: "eng".into(),
        extraction_timeout: Duration::from_secs(5),
        max_upload_bytes: 1024 * 1024,
        frontend_url: None,
    }
}

fn app(config: &Config) -> Router {
    let service = SummaryService::from_config(config).expect("service");
    api::create_router(Arc::new(service), config.max_upload_bytes)
}

fn upload_body(filename: &str, content_type: &str, data: &[u8], length: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(
        format!(
            "\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"length\"\r\n\r\n{length}\r\n--{BOUNDARY}--\r\n"
        )
        .as_bytes(),
    );
    body
}

async fn post(app: Router, body: Vec<u8>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/upload")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("router response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn pdf_extractor_emits_one_line_per_page() {
    let bytes = pdf_with_pages(&["Alpha beta.", "Gamma delta.", "Epsilon."]);
    let text = PdfExtractor::new(Duration::from_secs(5))
        .extract(bytes)
        .await
        .expect("pdf text");

    assert_eq!(text.source_page_count, Some(3));
    assert_eq!(text.content, "Alpha beta.\nGamma delta.\nEpsilon.\n");
    assert_eq!(text.content.split_terminator('\n').count(), 3);
}

#[tokio::test]
async fn two_page_pdf_round_trips_through_gemini() {
    let server = MockServer::start_async().await;
    let expected_prompt = build_prompt("Alpha beta.\nGamma delta.\n", LengthSelector::Short);
    let gemini = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(GEMINI_PATH)
                .header("x-goog-api-key", "integration-key")
                .json_body_partial(
                    json!({ "contents": [{ "role": "user", "parts": [{ "text": expected_prompt }] }] })
                        .to_string(),
                );
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "**Alpha** meets **Gamma**." }] }
                }]
            }));
        })
        .await;

    let config = config_for(&server);
    let pdf = pdf_with_pages(&["Alpha beta.", "Gamma delta."]);
    let (status, json) = post(
        app(&config),
        upload_body("report.pdf", "application/pdf", &pdf, "short"),
    )
    .await;

    gemini.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["filename"], "report.pdf");
    assert_eq!(json["summary"], "**Alpha** meets **Gamma**.");
    assert_eq!(json["textPreview"], "Alpha beta.\nGamma delta.\n");
    assert_eq!(json["pageCount"], 2);
    assert_eq!(
        json["segments"],
        json!([
            { "kind": "highlight", "text": "Alpha" },
            { "kind": "text", "text": " meets " },
            { "kind": "highlight", "text": "Gamma" },
            { "kind": "text", "text": "." }
        ])
    );
}

#[tokio::test]
async fn scanned_pdf_without_text_is_rejected_before_gemini() {
    let server = MockServer::start_async().await;
    let gemini = server
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_PATH);
            then.status(200).json_body(json!({
                "candidates": [{ "content": { "parts": [{ "text": "unused" }] } }]
            }));
        })
        .await;

    let config = config_for(&server);
    let pdf = pdf_with_pages(&["", ""]);
    let (status, json) = post(
        app(&config),
        upload_body("scan.pdf", "application/pdf", &pdf, "medium"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Could not extract text from file");
    assert_eq!(gemini.hits_async().await, 0);
}

#[tokio::test]
async fn corrupt_pdf_is_a_server_side_extraction_failure() {
    let server = MockServer::start_async().await;
    let config = config_for(&server);

    let (status, json) = post(
        app(&config),
        upload_body("broken.pdf", "application/pdf", b"%PDF-1.5 truncated", "long"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to extract text from file");
    assert_eq!(json["code"], "extraction_failed");
}

#[tokio::test]
async fn gemini_outage_is_reported_as_summarization_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_PATH);
            then.status(503).body("backend unavailable");
        })
        .await;

    let config = config_for(&server);
    let pdf = pdf_with_pages(&["Quarterly numbers improved."]);
    let (status, json) = post(
        app(&config),
        upload_body("q3.pdf", "application/pdf", &pdf, "medium"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to generate summary");
    assert_eq!(json["code"], "summarization_failed");
}

#[tokio::test]
async fn zip_upload_is_unsupported() {
    let server = MockServer::start_async().await;
    let config = config_for(&server);
    let dispatcher_probe = ExtractionDispatcher::from_config(&config);
    assert!(
        dispatcher_probe
            .extract("application/zip", vec![b'P', b'K'])
            .await
            .is_err()
    );

    let (status, json) = post(
        app(&config),
        upload_body("bundle.zip", "application/zip", b"PK\x03\x04", "short"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Unsupported file type");
}
