//! PDF text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which is CPU-bound and not
//! async-aware. [`extract_text`] moves the work onto Tokio's blocking pool so
//! request-handling worker threads never stall on a large document.
//!
//! Pages are read in document order. Image-only pages have no text layer and
//! contribute an empty string; no OCR is attempted.

use crate::error::PdfQaError;
use crate::pipeline::input::ensure_pdf_magic;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Text of a PDF, page by page.
///
/// Runs on a blocking thread; implementations may block freely.
pub trait TextExtractor: Send + Sync {
    /// Extract the text of every page, in page order.
    fn page_texts(&self, filename: &str, bytes: &[u8]) -> Result<Vec<String>, PdfQaError>;
}

/// Result of extracting a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
}

/// Concatenate page texts, each followed by a newline.
pub fn join_pages(pages: &[String]) -> String {
    let mut text = String::with_capacity(pages.iter().map(|p| p.len() + 1).sum());
    for page in pages {
        text.push_str(page);
        text.push('\n');
    }
    text
}

/// Extract the full text of `bytes` on the blocking pool.
pub async fn extract_text(
    extractor: Arc<dyn TextExtractor>,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<ExtractedText, PdfQaError> {
    let name = filename.to_string();
    let pages = tokio::task::spawn_blocking(move || extractor.page_texts(&name, &bytes))
        .await
        .map_err(|e| PdfQaError::Internal(format!("Extraction task panicked: {}", e)))??;

    let text = join_pages(&pages);
    info!(
        "Extracted {} pages ({} chars) from '{}'",
        pages.len(),
        text.len(),
        filename
    );

    Ok(ExtractedText {
        text,
        page_count: pages.len(),
    })
}

/// [`TextExtractor`] backed by the pdfium shared library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    library_path: Option<PathBuf>,
}

impl PdfiumExtractor {
    /// Search `PDFIUM_LIB_PATH`, the working directory, then the system path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to the library at exactly this path.
    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }

    /// Bind to pdfium, mapping failure to [`PdfQaError::PdfiumBindingFailed`].
    pub fn bind(&self) -> Result<Pdfium, PdfQaError> {
        let explicit = self
            .library_path
            .clone()
            .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

        let bindings = match explicit {
            Some(path) => {
                debug!("Binding pdfium from {}", path.display());
                Pdfium::bind_to_library(&path)
            }
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| PdfQaError::PdfiumBindingFailed(format!("{:?}", e)))?;

        Ok(Pdfium::new(bindings))
    }
}

impl TextExtractor for PdfiumExtractor {
    fn page_texts(&self, filename: &str, bytes: &[u8]) -> Result<Vec<String>, PdfQaError> {
        ensure_pdf_magic(filename, bytes)?;

        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| PdfQaError::CorruptPdf {
                filename: filename.to_string(),
                detail: format!("{:?}", e),
            })?;

        let pages = document.pages();
        debug!("PDF '{}' loaded: {} pages", filename, pages.len());

        let mut texts = Vec::with_capacity(pages.len() as usize);
        for (idx, page) in pages.iter().enumerate() {
            let text = page.text().map_err(|e| PdfQaError::CorruptPdf {
                filename: filename.to_string(),
                detail: format!("page {}: {:?}", idx + 1, e),
            })?;
            texts.push(text.all());
        }

        Ok(texts)
    }
}
