//! Document text extraction: turns an uploaded PDF or DOCX into plain text.
//!
//! Decoding is CPU-bound; async callers should run [`extract_text`] inside
//! `tokio::task::spawn_blocking`.

use thiserror::Error;
use tracing::debug;

pub mod docx;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file type '{0}'. Please upload a PDF or DOCX.")]
    UnsupportedFileType(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Could not read DOCX: {0}")]
    Docx(String),
}

/// Extracts plain text from a document, dispatching on its MIME type.
pub fn extract_text(bytes: &[u8], mime_type: &str) -> Result<String, DocumentError> {
    let mime = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let text = match mime.as_str() {
        PDF_MIME => extract_pdf(bytes)?,
        DOCX_MIME => docx::extract_docx_text(bytes)?,
        _ => return Err(DocumentError::UnsupportedFileType(mime_type.to_string())),
    };

    debug!("extracted {} chars from {mime} document", text.len());
    Ok(text)
}

/// Page text in page order, one line break between pages.
fn extract_pdf(bytes: &[u8]) -> Result<String, DocumentError> {
    let text =
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| DocumentError::Pdf(e.to_string()))?;
    // pdf-extract marks page boundaries with form feeds on some inputs
    Ok(text.replace('\u{c}', "\n"))
}
