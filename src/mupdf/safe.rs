//! Thread-safe document wrapper for MuPDF
//!
//! MuPDF documents are not thread-safe. This wrapper:
//!
//! 1. Stores the document path and the page count read at open time
//! 2. Opens a fresh document for each operation
//! 3. Uses `parking_lot::Mutex` to serialize access
//!
//! Nothing MuPDF-owned escapes an operation's closure, so the wrapper itself
//! can be shared with the conversion worker through an `Arc`.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use mupdf::{Colorspace, Document, Matrix, MetadataName, TextPageOptions};
use parking_lot::Mutex;

use crate::document::{
    DocumentError, DocumentFormat, DocumentInfo, DocumentResult, PageSize, PageSource, PageText,
    RenderedPage,
};

use super::pixmap::encode_png;
use super::stext::{extract_page_text, StextOptions};

/// Thread-safe document wrapper
pub struct SafeDocument {
    path: PathBuf,
    page_count: usize,
    /// Mutex for serializing access
    lock: Mutex<()>,
}

impl SafeDocument {
    /// Open a PDF from disk
    ///
    /// Validates the file is a PDF (extension or `%PDF` magic) and that
    /// MuPDF can read its page tree.
    pub fn open<P: AsRef<Path>>(path: P) -> DocumentResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(DocumentError::NotFound(path));
        }

        detect_format(&path)?;

        let doc = Document::open(&*path.to_string_lossy())
            .map_err(|e| DocumentError::LoadError(format!("{}: {}", path.display(), e)))?;
        let page_count = doc.page_count()?.max(0) as usize;

        tracing::debug!("Opened {} ({} pages)", path.display(), page_count);

        Ok(Self {
            path,
            page_count,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Execute a closure with access to the document
    ///
    /// This opens a fresh document, executes the closure, and ensures
    /// the document is dropped afterward. Access is serialized via mutex.
    pub fn with_doc<F, R>(&self, f: F) -> DocumentResult<R>
    where
        F: FnOnce(&Document) -> DocumentResult<R>,
    {
        let _guard = self.lock.lock();
        let doc = Document::open(&*self.path.to_string_lossy())?;
        f(&doc)
    }

    fn check_index(&self, index: usize) -> DocumentResult<()> {
        if index >= self.page_count {
            return Err(DocumentError::PageNotFound {
                index,
                count: self.page_count,
            });
        }
        Ok(())
    }

    /// Render one page scaled to `width` pixels and encode it as PNG
    pub fn render_page(&self, index: usize, width: u32) -> DocumentResult<RenderedPage> {
        self.check_index(index)?;

        self.with_doc(|doc| {
            let page = doc.load_page(index as i32)?;
            let bounds = page.bounds()?;
            let page_width = (bounds.x1 - bounds.x0).max(1.0);

            let zoom = width as f32 / page_width;
            let matrix = Matrix::new_scale(zoom, zoom);
            let pixmap = page
                .to_pixmap(&matrix, &Colorspace::device_rgb(), false, true)
                .map_err(|e| DocumentError::RenderError(format!("page {}: {}", index + 1, e)))?;

            let (png, width, height) = encode_png(&pixmap)?;
            Ok(RenderedPage {
                index,
                width,
                height,
                png,
            })
        })
    }

    /// Check whether the first page carries extractable text
    pub fn has_text_layer(&self) -> DocumentResult<bool> {
        if self.page_count == 0 {
            return Ok(false);
        }

        self.with_doc(|doc| {
            let page = doc.load_page(0)?;
            let text_page = page.to_text_page(TextPageOptions::empty())?;
            let text = text_page.to_text()?;
            Ok(!text.trim().is_empty())
        })
    }
}

impl PageSource for SafeDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn info(&self) -> DocumentResult<DocumentInfo> {
        self.with_doc(|doc| {
            let get_meta = |name: MetadataName| -> Option<String> {
                doc.metadata(name).ok().filter(|s| !s.trim().is_empty())
            };

            let title = get_meta(MetadataName::Title).unwrap_or_else(|| {
                self.path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });

            let mut pages = Vec::with_capacity(self.page_count);
            for i in 0..self.page_count {
                let bounds = doc.load_page(i as i32)?.bounds()?;
                pages.push(PageSize {
                    width: bounds.x1 - bounds.x0,
                    height: bounds.y1 - bounds.y0,
                });
            }

            Ok(DocumentInfo {
                path: self.path.clone(),
                title,
                author: get_meta(MetadataName::Author),
                page_count: self.page_count,
                pages,
            })
        })
    }

    fn page_text(&self, index: usize) -> DocumentResult<PageText> {
        self.check_index(index)?;

        self.with_doc(|doc| {
            let page = doc.load_page(index as i32)?;
            extract_page_text(&page, index, &StextOptions::default())
        })
    }
}

fn detect_format(path: &Path) -> DocumentResult<DocumentFormat> {
    if let Some(format) = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(DocumentFormat::from_extension)
    {
        return Ok(format);
    }

    let mut magic = [0u8; 8];
    let read = File::open(path)?.read(&mut magic)?;
    DocumentFormat::from_magic_bytes(&magic[..read]).ok_or_else(|| {
        DocumentError::UnsupportedFormat(format!("{} is not a PDF file", path.display()))
    })
}
