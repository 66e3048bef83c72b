//! Document error types
//!
//! Error handling for opening, rendering and converting PDF documents.

use std::path::PathBuf;

use thiserror::Error;

/// Unified document error type
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Input file does not exist
    #[error("Document not found: {0}")]
    NotFound(PathBuf),

    /// Page index out of range
    #[error("Page {index} not found (document has {count} pages)")]
    PageNotFound { index: usize, count: usize },

    /// Input is not a PDF
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Failed to load the document
    #[error("Load error: {0}")]
    LoadError(String),

    /// Failed to render a page
    #[error("Render error: {0}")]
    RenderError(String),

    /// Text extraction error
    #[error("Text extraction error: {0}")]
    TextExtractionError(String),

    /// MuPDF context error
    #[error("MuPDF error: {0}")]
    MuPdf(String),

    /// Failed to build an output document
    #[error("Output error: {0}")]
    OutputError(String),

    /// Image processing error
    #[error("Image error: {0}")]
    ImageError(String),

    /// Worker thread failed
    #[error("Worker error: {0}")]
    WorkerError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for document operations
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Alias for Result
pub type DocumentResult<T> = Result<T>;

impl From<mupdf::Error> for DocumentError {
    fn from(err: mupdf::Error) -> Self {
        DocumentError::MuPdf(err.to_string())
    }
}

impl From<quick_xml::Error> for DocumentError {
    fn from(err: quick_xml::Error) -> Self {
        DocumentError::OutputError(format!("XML: {}", err))
    }
}

impl From<zip::result::ZipError> for DocumentError {
    fn from(err: zip::result::ZipError) -> Self {
        DocumentError::OutputError(format!("ZIP: {}", err))
    }
}

impl From<image::ImageError> for DocumentError {
    fn from(err: image::ImageError) -> Self {
        DocumentError::ImageError(err.to_string())
    }
}
