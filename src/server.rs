//! HTTP surface: health, upload and ask endpoints.
//!
//! | Method | Path            | Body                      | Success |
//! |--------|-----------------|---------------------------|---------|
//! | GET    | `/`             |                           | `{"message": ...}` |
//! | POST   | `/upload-pdf`   | multipart, field `file`   | `{"message": ...}` |
//! | POST   | `/ask-question` | `{"question": "..."}`     | [`Answer`] |
//!
//! Errors are `{"detail": "..."}` with the status from
//! [`PdfQaError::status_code`].

use crate::ask::answer_question;
use crate::config::ServerConfig;
use crate::error::PdfQaError;
use crate::output::{Answer, AskRequest, MessageResponse};
use crate::pipeline::extract::{extract_text, PdfiumExtractor, TextExtractor};
use crate::pipeline::input::ensure_pdf_filename;
use crate::pipeline::llm::{InferenceClient, OllamaClient};
use crate::store::{DocumentStore, InMemoryDocumentStore};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Liveness message returned by `GET /`.
pub const HEALTH_MESSAGE: &str = "PDF Question Answering System API is running";

/// Message returned after a successful upload.
pub const UPLOAD_MESSAGE: &str = "PDF uploaded and processed successfully";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub extractor: Arc<dyn TextExtractor>,
    pub inference: Arc<dyn InferenceClient>,
}

impl AppState {
    /// Production wiring: in-memory store, pdfium, Ollama.
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(InMemoryDocumentStore::new(config.active_document));
        let extractor = match &config.pdfium_lib_path {
            Some(path) => PdfiumExtractor::with_library_path(path),
            None => PdfiumExtractor::new(),
        };
        let inference = Arc::new(OllamaClient::from_config(&config));

        Self {
            config: Arc::new(config),
            store,
            extractor: Arc::new(extractor),
            inference,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_inference(mut self, inference: Arc<dyn InferenceClient>) -> Self {
        self.inference = inference;
        self
    }
}

/// Build the application router with CORS, tracing and the upload limit.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(health))
        .route("/upload-pdf", post(upload_pdf))
        .route("/ask-question", post(ask_question))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http());

    if state.config.permissive_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app.with_state(state)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /
async fn health() -> Json<MessageResponse> {
    Json(MessageResponse::new(HEALTH_MESSAGE))
}

/// POST /upload-pdf
///
/// Reads the `file` field, rejects non-`.pdf` names before touching the
/// body, extracts the text and stores it under the filename.
async fn upload_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>, PdfQaError> {
    let mut multipart = multipart.map_err(|e| PdfQaError::InvalidRequest(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some("file") {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        let filename = ensure_pdf_filename(field.file_name())?.to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(multipart_error)?;
        debug!("Received '{}' ({} bytes)", filename, bytes.len());

        let extracted = extract_text(Arc::clone(&state.extractor), &filename, bytes.to_vec()).await?;
        state
            .store
            .put(&filename, extracted.text, extracted.page_count);
        info!(
            "Stored '{}' ({} documents in store)",
            filename,
            state.store.len()
        );

        return Ok(Json(MessageResponse::new(UPLOAD_MESSAGE)));
    }

    Err(PdfQaError::MissingFile)
}

/// Oversized bodies keep their 413; any other multipart fault is a 422.
fn multipart_error(e: MultipartError) -> PdfQaError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PdfQaError::PayloadTooLarge(e.body_text())
    } else {
        PdfQaError::InvalidRequest(e.body_text())
    }
}

/// POST /ask-question
///
/// The empty-store check runs before the body is validated, so a question
/// sent before any upload is always answered with 400.
async fn ask_question(
    State(state): State<AppState>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<Answer>, PdfQaError> {
    if state.store.is_empty() {
        return Err(PdfQaError::NoDocument);
    }

    let Json(request) = body.map_err(|e| PdfQaError::InvalidRequest(e.body_text()))?;
    let answer = answer_question(
        state.store.as_ref(),
        state.inference.as_ref(),
        &state.config,
        &request,
    )
    .await?;

    Ok(Json(answer))
}
