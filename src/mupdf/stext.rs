//! Structured Text Helpers
//!
//! Turns MuPDF structured text into [`PageText`] blocks and lines.

use mupdf::{Page, TextPageOptions};

use crate::document::{BoundingBox, DocumentError, PageText, Result, TextBlock, TextLine};

/// Options for structured text extraction
#[derive(Debug, Clone, Default)]
pub struct StextOptions {
    /// Preserve whitespace
    pub preserve_whitespace: bool,
    /// Preserve ligatures
    pub preserve_ligatures: bool,
    /// Inhibit spaces between characters
    pub inhibit_spaces: bool,
}

impl StextOptions {
    /// Convert to MuPDF TextPageOptions
    pub fn to_mupdf_options(&self) -> TextPageOptions {
        let mut opts = TextPageOptions::empty();

        if self.preserve_whitespace {
            opts |= TextPageOptions::PRESERVE_WHITESPACE;
        }
        if self.preserve_ligatures {
            opts |= TextPageOptions::PRESERVE_LIGATURES;
        }
        if self.inhibit_spaces {
            opts |= TextPageOptions::INHIBIT_SPACES;
        }

        opts
    }
}

/// Extract the text blocks of a page
///
/// Image blocks and lines without any decodable character are skipped.
pub fn extract_page_text(page: &Page, index: usize, options: &StextOptions) -> Result<PageText> {
    let text_page = page
        .to_text_page(options.to_mupdf_options())
        .map_err(|e| DocumentError::TextExtractionError(format!("page {}: {}", index + 1, e)))?;
    let bounds = page.bounds()?;

    let mut blocks = Vec::new();

    for block in text_page.blocks() {
        let b = block.bounds();
        let mut lines = Vec::new();

        for line in block.lines() {
            let mut text = String::new();
            let mut font_size = None;

            for ch in line.chars() {
                if let Some(c) = ch.char() {
                    font_size.get_or_insert(ch.size());
                    text.push(c);
                }
            }

            if text.is_empty() {
                continue;
            }

            let l = line.bounds();
            lines.push(TextLine {
                bbox: BoundingBox::from_ltrb(l.x0, l.y0, l.x1, l.y1),
                text,
                font_size: font_size.unwrap_or(0.0),
            });
        }

        if !lines.is_empty() {
            blocks.push(TextBlock {
                bbox: BoundingBox::from_ltrb(b.x0, b.y0, b.x1, b.y1),
                lines,
            });
        }
    }

    Ok(PageText {
        index,
        width: bounds.x1 - bounds.x0,
        height: bounds.y1 - bounds.y0,
        blocks,
    })
}
