//! Document abstraction
//!
//! Types shared between PDF access, preview and conversion, plus the
//! [`PageSource`] seam that lets conversion run against anything that can
//! hand out page text.
//!
//! ```text
//!   SafeDocument (MuPDF) ──┐
//!                          ├── PageSource ──► Converter (TXT / HTML / DOCX)
//!   test fixtures ─────────┘
//! ```

mod error;
mod traits;
mod types;

pub use error::{DocumentError, DocumentResult, Result};
pub use traits::PageSource;
pub use types::{
    BoundingBox, DocumentFormat, DocumentInfo, OutputFormat, PageSize, PageText, Rect,
    RenderedPage, TextBlock, TextLine,
};
