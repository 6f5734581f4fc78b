//! Error types for the edgequake-pdfqa library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PdfQaError`]: **hard fault**, the request cannot be served (bad
//!   upload, extraction failure, inference endpoint down). Rendered as an
//!   HTTP error response `{"detail": "<message>"}` with the status from
//!   [`PdfQaError::status_code`].
//!
//! * [`AnswerParseError`]: **soft degrade**, the model answered, but its
//!   output could not be turned into an [`crate::output::Answer`]. Never
//!   surfaced as an error status; [`crate::pipeline::answer::parse_answer_or_fallback`]
//!   folds it into a fallback answer whose `explanation` is this message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, PdfQaError>;

/// All hard faults returned by the edgequake-pdfqa library.
#[derive(Debug, Error)]
pub enum PdfQaError {
    // ── Upload errors ─────────────────────────────────────────────────────
    /// Uploaded filename does not end in `.pdf`.
    #[error("File must be a PDF")]
    NotAPdf { filename: Option<String> },

    /// The multipart body had no `file` field.
    #[error("Field required: multipart field 'file' is missing")]
    MissingFile,

    /// The request body could not be decoded.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upload exceeded the configured body limit.
    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The PDF could not be opened or its text could not be read.
    #[error("Failed to extract text from '{filename}': {detail}")]
    CorruptPdf { filename: String, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or place the library next to the binary."
    )]
    PdfiumBindingFailed(String),

    // ── Store errors ──────────────────────────────────────────────────────
    /// A question was asked before any document was uploaded.
    #[error("No PDF uploaded yet")]
    NoDocument,

    /// The request named a document that was never uploaded.
    #[error("Document '{filename}' has not been uploaded")]
    DocumentNotFound { filename: String },

    // ── Inference errors ──────────────────────────────────────────────────
    /// The inference endpoint answered with a non-success status.
    #[error("Error calling Ollama API: {body}")]
    InferenceStatus { status: u16, body: String },

    /// The inference endpoint could not be reached.
    #[error("Failed to reach inference endpoint '{url}': {reason}")]
    InferenceUnavailable { url: String, reason: String },

    /// The inference call exceeded the configured timeout.
    #[error("Inference call timed out after {timeout:?}")]
    InferenceTimeout { timeout: Duration },

    /// The endpoint replied 2xx but the body was not the expected JSON.
    #[error("Invalid response from inference endpoint: {0}")]
    InvalidInferenceResponse(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PdfQaError {
    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PdfQaError::NotAPdf { .. } | PdfQaError::NoDocument => StatusCode::BAD_REQUEST,
            PdfQaError::MissingFile | PdfQaError::InvalidRequest(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PdfQaError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            PdfQaError::DocumentNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for PdfQaError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("Rejected request ({}): {}", status, self);
        }

        let body = Json(ErrorResponse {
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Why the model's output could not be turned into an answer.
///
/// The `Display` text of each variant becomes the `explanation` of the
/// fallback answer returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerParseError {
    /// No `{` or no `}` anywhere in the generated text.
    #[error("No JSON object found in response")]
    NoJsonObject,

    /// The candidate span is not valid JSON.
    #[error("{0}")]
    InvalidJson(String),

    /// The parsed object lacks one or more required keys.
    #[error("Missing required fields in response: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}
