//! # Server Tests
//!
//! Drives the HTTP router in-process with multipart uploads.

#![cfg(feature = "server")]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use image::{Rgb, RgbImage};
use serial_stamp::output::encode_png;
use serial_stamp::render::FontConfig;
use serial_stamp::server::{AppState, ServerConfig, router};
use tower::ServiceExt;

const BOUNDARY: &str = "serial-stamp-test-boundary";

const SPEC: &str = r#"
stack-size = 2
[layout]
grid-size = [2, 1]
gap = 4
[[texts]]
template = "$n"
position = [1, 1]
[[params]]
name = "n"
min = 1
max = 5
"#;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn app() -> Router {
    router(AppState::with_fonts(
        ServerConfig::default(),
        FontConfig::bundled_only(),
    ))
}

fn png(width: u32, height: u32) -> Vec<u8> {
    encode_png(&RgbImage::from_pixel(width, height, Rgb([240, 240, 240]))).unwrap()
}

/// Build a multipart body from `(name, bytes)` fields.
fn multipart(fields: &[(&str, &[u8])]) -> Body {
    let mut body = Vec::new();
    for (name, bytes) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    Body::from(body)
}

async fn post(uri: &str, fields: &[(&str, &[u8])]) -> (StatusCode, Option<String>, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(multipart(fields))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

fn error_message(body: &[u8]) -> String {
    let value: serde_json::Value = serde_json::from_slice(body).unwrap();
    assert_eq!(value["success"], false);
    value["error"].as_str().unwrap().to_string()
}

// ============================================================================
// ENDPOINTS
// ============================================================================

#[tokio::test]
async fn test_index_page() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("/api/"));
}

#[tokio::test]
async fn test_plan() {
    let (status, content_type, body) = post("/api/plan", &[("spec", SPEC.as_bytes())]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));

    let plan: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(plan["ticket_count"], 5);
    assert_eq!(plan["tickets_per_page"], 2);
    assert_eq!(plan["pages_needed"], 3);
    assert_eq!(plan["total_pages"], 4);
}

#[tokio::test]
async fn test_preview_returns_first_page_png() {
    let template = png(20, 10);
    let (status, content_type, body) =
        post("/api/preview", &[("spec", SPEC.as_bytes()), ("image", template.as_slice())]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));

    let page = image::load_from_memory(&body).unwrap();
    assert_eq!((page.width(), page.height()), (44, 10));
}

#[tokio::test]
async fn test_generate_returns_pdf() {
    let template = png(20, 10);
    let (status, content_type, body) =
        post("/api/generate", &[("spec", SPEC.as_bytes()), ("image", template.as_slice())]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/pdf"));
    assert!(body.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_zero_grid_preview_has_no_content() {
    let template = png(20, 10);
    let spec = "[layout]\ngrid-size = [0, 0]\n";
    let (status, _, body) =
        post("/api/preview", &[("spec", spec.as_bytes()), ("image", template.as_slice())]).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

// ============================================================================
// ERRORS
// ============================================================================

#[tokio::test]
async fn test_missing_image_is_bad_request() {
    let (status, _, body) = post("/api/preview", &[("spec", SPEC.as_bytes())]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("image"));
}

#[tokio::test]
async fn test_invalid_spec_is_bad_request() {
    let template = png(4, 4);
    let (status, _, body) = post(
        "/api/generate",
        &[
            ("spec", b"stack-size = 0\n[layout]\ngrid-size = [1, 1]\n".as_slice()),
            ("image", template.as_slice()),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("stack-size"));
}

#[tokio::test]
async fn test_undecodable_image_is_bad_request() {
    let (status, _, body) = post(
        "/api/preview",
        &[("spec", SPEC.as_bytes()), ("image", b"not an image".as_slice())],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("decode"));
}
