//! Document traits

use super::error::Result;
use super::types::{DocumentInfo, PageText};

/// Source of per-page text for conversion
///
/// Implementations must be usable from a blocking worker thread.
pub trait PageSource: Send + Sync {
    /// Number of pages
    fn page_count(&self) -> usize;

    /// Document summary (title, page sizes)
    fn info(&self) -> Result<DocumentInfo>;

    /// Extract text with positions from one page
    fn page_text(&self, index: usize) -> Result<PageText>;
}
