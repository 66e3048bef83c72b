//! Low-level MuPDF Wrapper
//!
//! This module provides a safe, thread-aware wrapper around the MuPDF library.
//!
//! # Thread Safety
//!
//! MuPDF's `fz_context` is **NOT thread-safe**. [`SafeDocument`] stores only
//! the path and reopens the document under a mutex for every operation, so
//! it can be handed to the conversion worker.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pdf_converter::document::PageSource;
//! use pdf_converter::mupdf::SafeDocument;
//!
//! let doc = SafeDocument::open("report.pdf")?;
//! let first = doc.page_text(0)?;
//! let preview = doc.render_page(0, 600)?;
//! ```

mod pixmap;
mod safe;
mod stext;

pub use safe::SafeDocument;
pub use stext::{extract_page_text, StextOptions};
