//! Page previews
//!
//! Renders the first few pages of a document to PNG, or collects their
//! text when only a quick look at the content is wanted.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::document::{DocumentError, DocumentResult, PageSource, RenderedPage};
use crate::mupdf::SafeDocument;

pub const DEFAULT_MAX_PAGES: usize = 5;
pub const DEFAULT_WIDTH: u32 = 600;
/// Narrower requests fall back to [`DEFAULT_WIDTH`]
pub const MIN_WIDTH: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewOptions {
    pub max_pages: usize,
    /// Target width in pixels
    pub width: u32,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            width: DEFAULT_WIDTH,
        }
    }
}

impl PreviewOptions {
    pub fn new(max_pages: usize, width: u32) -> Self {
        Self { max_pages, width }.normalized()
    }

    /// At least one page; widths under [`MIN_WIDTH`] become the default
    pub fn normalized(self) -> Self {
        Self {
            max_pages: self.max_pages.max(1),
            width: if self.width < MIN_WIDTH {
                DEFAULT_WIDTH
            } else {
                self.width
            },
        }
    }

    /// Pages shown for a document of `page_count` pages
    pub fn pages_to_show(&self, page_count: usize) -> usize {
        page_count.min(self.max_pages)
    }
}

/// Rendered preview pages
#[derive(Debug, Clone)]
pub struct Preview {
    pub pages: Vec<RenderedPage>,
    pub total_pages: usize,
}

impl Preview {
    /// Pages of the document not included in the preview
    pub fn remaining(&self) -> usize {
        self.total_pages.saturating_sub(self.pages.len())
    }
}

pub fn render_preview(doc: &SafeDocument, opts: PreviewOptions) -> DocumentResult<Preview> {
    let opts = opts.normalized();
    let total_pages = doc.page_count();
    let shown = opts.pages_to_show(total_pages);

    let mut pages = Vec::with_capacity(shown);
    for index in 0..shown {
        pages.push(doc.render_page(index, opts.width)?);
    }

    tracing::debug!(
        "Rendered {} of {} pages of {} at {}px",
        shown,
        total_pages,
        doc.path().display(),
        opts.width
    );
    Ok(Preview { pages, total_pages })
}

/// Render on the blocking pool
pub async fn render_preview_async(
    doc: Arc<SafeDocument>,
    opts: PreviewOptions,
) -> DocumentResult<Preview> {
    tokio::task::spawn_blocking(move || render_preview(&doc, opts))
        .await
        .map_err(|e| DocumentError::RenderError(format!("Task join error: {}", e)))?
}

/// `page-001.png` for the first page
pub fn page_file_name(index: usize) -> String {
    format!("page-{:03}.png", index + 1)
}

/// Write every preview page into `dir`, returning the written paths
pub fn write_preview(preview: &Preview, dir: &Path) -> DocumentResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    preview
        .pages
        .iter()
        .map(|page| {
            let path = dir.join(page_file_name(page.index));
            fs::write(&path, &page.png)?;
            Ok(path)
        })
        .collect()
}

/// Extracted text of the first pages
#[derive(Debug, Clone, PartialEq)]
pub struct TextPreview {
    pub text: String,
    pub shown: usize,
    pub total_pages: usize,
}

impl TextPreview {
    pub fn remaining(&self) -> usize {
        self.total_pages.saturating_sub(self.shown)
    }
}

/// Join the text of up to `max_pages` pages, one blank line between pages
pub fn text_preview<S>(source: &S, max_pages: usize) -> DocumentResult<TextPreview>
where
    S: PageSource + ?Sized,
{
    let total_pages = source.page_count();
    let shown = total_pages.min(max_pages.max(1));

    let mut pages = Vec::with_capacity(shown);
    for index in 0..shown {
        let page = source.page_text(index)?;
        let lines: Vec<&str> = page
            .blocks
            .iter()
            .flat_map(|b| b.lines.iter())
            .map(|l| l.text.as_str())
            .collect();
        pages.push(lines.join("\n"));
    }

    Ok(TextPreview {
        text: pages.join("\n\n"),
        shown,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::fixtures::*;
    use tempfile::TempDir;

    #[test]
    fn test_options_normalize() {
        assert_eq!(PreviewOptions::default(), PreviewOptions::new(5, 600));
        assert_eq!(PreviewOptions::new(3, 50).width, DEFAULT_WIDTH);
        assert_eq!(PreviewOptions::new(3, 100).width, 100);
        assert_eq!(PreviewOptions::new(0, 800).max_pages, 1);
    }

    #[test]
    fn test_pages_to_show_and_remaining() {
        let opts = PreviewOptions::default();
        assert_eq!(opts.pages_to_show(2), 2);
        assert_eq!(opts.pages_to_show(12), 5);

        let preview = Preview {
            pages: (0..5)
                .map(|index| RenderedPage {
                    index,
                    width: 600,
                    height: 776,
                    png: Vec::new(),
                })
                .collect(),
            total_pages: 12,
        };
        assert_eq!(preview.remaining(), 7);
    }

    #[test]
    fn test_write_preview_names_files() {
        let temp_dir = TempDir::new().unwrap();
        let preview = Preview {
            pages: vec![
                RenderedPage {
                    index: 0,
                    width: 1,
                    height: 1,
                    png: b"\x89PNG first".to_vec(),
                },
                RenderedPage {
                    index: 1,
                    width: 1,
                    height: 1,
                    png: b"\x89PNG second".to_vec(),
                },
            ],
            total_pages: 2,
        };

        let out = temp_dir.path().join("previews");
        let written = write_preview(&preview, &out).unwrap();
        assert_eq!(written, vec![out.join("page-001.png"), out.join("page-002.png")]);
        assert_eq!(fs::read(&written[1]).unwrap(), b"\x89PNG second");
    }

    #[test]
    fn test_text_preview_limits_pages() {
        let source = FakeSource::new(
            (0..4)
                .map(|i| {
                    page(
                        i,
                        vec![vec![
                            line(&format!("page {}", i + 1), 72.0, 72.0, 12.0),
                            line("body", 72.0, 86.0, 12.0),
                        ]],
                    )
                })
                .collect(),
        );

        let preview = text_preview(&source, 2).unwrap();
        assert_eq!(preview.text, "page 1\nbody\n\npage 2\nbody");
        assert_eq!(preview.shown, 2);
        assert_eq!(preview.remaining(), 2);
    }
}
