//! # edgequake-pdfqa
//!
//! Ask natural-language questions about a PDF, answered by a local language
//! model served by [Ollama](https://ollama.com).
//!
//! Upload a PDF, the service extracts its text with pdfium and keeps it in
//! memory. Each question is combined with that text into a prompt asking the
//! model for a strict JSON answer, which is parsed and returned.
//!
//! ## Pipeline Overview
//!
//! ```text
//! POST /upload-pdf
//!  ├─ 1. Input    filename must end in `.pdf`
//!  ├─ 2. Extract  page text via pdfium (spawn_blocking)
//!  └─ 3. Store    filename → text, in process memory
//!
//! POST /ask-question
//!  ├─ 4. Prompt   document text + question + JSON instructions
//!  ├─ 5. LLM      one POST to /api/generate (stream: false)
//!  └─ 6. Answer   first `{` … last `}` → {answer, page_references, explanation}
//!                 or a fallback apology if that fails
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfqa::{router, AppState, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::builder()
//!         .model("deepseek-r1:1.5b")
//!         .build()?;
//!     let addr = config.socket_addr()?;
//!     let app = router(AppState::new(config));
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfqa` binary (clap + anyhow + tracing-subscriber) |
//!
//! ## Known limitations
//!
//! - Documents are held in memory only and are lost on restart.
//! - The whole document goes into every prompt; large PDFs can overflow the
//!   model's context window.
//! - The inference call is not retried, and waits indefinitely unless a
//!   timeout is configured.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod ask;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod server;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use ask::answer_question;
pub use config::{ServerConfig, ServerConfigBuilder};
pub use error::{AnswerParseError, PdfQaError};
pub use output::{Answer, AskRequest, MessageResponse};
pub use pipeline::extract::{PdfiumExtractor, TextExtractor};
pub use pipeline::llm::{InferenceClient, OllamaClient};
pub use server::{router, AppState};
pub use store::{ActiveDocumentPolicy, DocumentStore, InMemoryDocumentStore, StoredDocument};
