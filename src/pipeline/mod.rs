//! Pipeline stages for answering a question about an uploaded PDF.
//!
//! Each submodule implements exactly one step.
//!
//! ## Data Flow
//!
//! ```text
//! upload:  input ──▶ extract ──▶ store
//!          (.pdf?)   (pdfium)
//!
//! ask:     store ──▶ prompt ──▶ llm ──▶ postprocess ──▶ answer
//!                               (Ollama) (cleanup)      (JSON span)
//! ```
//!
//! 1. [`input`]       filename and magic-byte checks on the upload
//! 2. [`extract`]     page text via pdfium, on the blocking pool
//! 3. [`llm`]         one HTTP call to the generation endpoint
//! 4. [`postprocess`] newline collapsing and optional reasoning stripping
//! 5. [`answer`]      first-`{`/last-`}` extraction, validation, fallback

pub mod answer;
pub mod extract;
pub mod input;
pub mod llm;
pub mod postprocess;
