//! End-to-end tests against the real collaborators.
//!
//! These tests bind the pdfium shared library and, for the ask test, call a
//! live Ollama. They are gated behind the `E2E_ENABLED` environment variable
//! so they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=./libpdfium.so cargo test --test e2e -- --nocapture
//!
//! The ask test additionally needs `ollama serve` with the configured model
//! pulled (`PDFQA_MODEL`, default `deepseek-r1:1.5b`).

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use edgequake_pdfqa::pipeline::extract::extract_text;
use edgequake_pdfqa::{router, AppState, PdfiumExtractor, ServerConfig, TextExtractor};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

// ── Test helpers ─────────────────────────────────────────────────────────────

macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

/// A minimal valid PDF with one Helvetica text line per page.
fn minimal_pdf(pages: &[&str]) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", 4 + 2 * i))
        .collect();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages.len()
    ));
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());
    for (i, text) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            5 + 2 * i
        ));
        let stream = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    out
}

fn multipart_upload(filename: &str, content: &[u8]) -> Request<Body> {
    let boundary = "pdfqa-e2e";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload-pdf")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// ── pdfium ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_pdfium_extracts_pages_in_order() {
    e2e_skip_unless_enabled!();

    let pdf = minimal_pdf(&["The invoice total is 1234 euros", "Payment is due in March"]);
    let extracted = extract_text(Arc::new(PdfiumExtractor::new()), "invoice.pdf", pdf)
        .await
        .expect("pdfium extraction failed");

    println!("Extracted:\n{}", extracted.text);
    assert_eq!(extracted.page_count, 2);
    let first = extracted.text.find("1234 euros").expect("page 1 text missing");
    let second = extracted.text.find("March").expect("page 2 text missing");
    assert!(first < second, "pages out of order");
    assert!(extracted.text.ends_with('\n'));
}

#[tokio::test]
async fn test_pdfium_rejects_truncated_pdf() {
    e2e_skip_unless_enabled!();

    let mut pdf = minimal_pdf(&["hello"]);
    pdf.truncate(40);
    let result = PdfiumExtractor::new().page_texts("truncated.pdf", &pdf);
    assert!(result.is_err(), "truncated PDF should not load");
}

#[tokio::test]
async fn test_upload_with_real_pdfium() {
    e2e_skip_unless_enabled!();

    let app = router(AppState::new(ServerConfig::default()));
    let response = app
        .oneshot(multipart_upload(
            "memo.pdf",
            &minimal_pdf(&["Quarterly memo"]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ── Live Ollama ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ask_live_model() {
    e2e_skip_unless_enabled!();

    let mut builder = ServerConfig::builder().inference_timeout_secs(300);
    if let Ok(model) = std::env::var("PDFQA_MODEL") {
        builder = builder.model(model);
    }
    if let Ok(url) = std::env::var("OLLAMA_URL") {
        builder = builder.inference_url(url);
    }
    let app = router(AppState::new(builder.build().unwrap()));

    let pdf = minimal_pdf(&[
        "Project Falcon overview",
        "The launch date of Project Falcon is 14 June 2025",
    ]);
    let response = app
        .clone()
        .oneshot(multipart_upload("falcon.pdf", &pdf))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let ask = Request::builder()
        .method("POST")
        .uri("/ask-question")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "question": "What is the launch date of Project Falcon?" }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(ask).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let answer: Value = serde_json::from_slice(&bytes).unwrap();
    println!("Answer: {answer:#}");

    // Small models do not always emit valid JSON; both shapes are acceptable.
    assert!(answer["answer"].is_string());
    assert!(answer["page_references"].is_array());
    assert!(answer["explanation"].is_string());
}
