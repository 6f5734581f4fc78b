//! Upload validation: decide whether an uploaded file is accepted as a PDF.
//!
//! Acceptance is decided by filename alone: the name must end in the literal,
//! case-sensitive suffix `.pdf`. The `%PDF` header check in
//! [`ensure_pdf_magic`] runs later, inside extraction, so a file that passes
//! the name check but is not really a PDF fails as a server error rather than
//! a client one.

use crate::error::PdfQaError;

/// Literal suffix an uploaded filename must carry.
pub const PDF_SUFFIX: &str = ".pdf";

/// Magic bytes every PDF starts with.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Return the filename if it ends in `.pdf`, otherwise [`PdfQaError::NotAPdf`].
pub fn ensure_pdf_filename(filename: Option<&str>) -> Result<&str, PdfQaError> {
    match filename {
        Some(name) if name.ends_with(PDF_SUFFIX) => Ok(name),
        other => Err(PdfQaError::NotAPdf {
            filename: other.map(str::to_string),
        }),
    }
}

/// Check the `%PDF` header before handing bytes to pdfium.
pub fn ensure_pdf_magic(filename: &str, bytes: &[u8]) -> Result<(), PdfQaError> {
    if bytes.len() >= PDF_MAGIC.len() && &bytes[..PDF_MAGIC.len()] == PDF_MAGIC {
        return Ok(());
    }
    let first: Vec<u8> = bytes.iter().take(PDF_MAGIC.len()).copied().collect();
    Err(PdfQaError::CorruptPdf {
        filename: filename.to_string(),
        detail: format!("not a PDF file (first bytes: {:?})", first),
    })
}
