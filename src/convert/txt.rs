//! Plain text output

use crate::document::{DocumentInfo, DocumentResult, OutputFormat, PageText};

use super::Converter;

/// Page separator written after every page
pub const PAGE_BREAK: char = '\x0c';

/// UTF-8 text, one line per extracted line
///
/// Blocks are separated by a blank line and every page ends with a form
/// feed, matching what `pdftotext` style tools emit.
#[derive(Debug, Clone, Copy, Default)]
pub struct TxtConverter;

impl Converter for TxtConverter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Txt
    }

    fn render(&self, _info: &DocumentInfo, pages: &[PageText]) -> DocumentResult<Vec<u8>> {
        let mut out = String::new();

        for page in pages {
            for block in &page.blocks {
                for line in &block.lines {
                    out.push_str(&line.text);
                    out.push('\n');
                }
                out.push('\n');
            }
            out.push(PAGE_BREAK);
        }

        Ok(out.into_bytes())
    }
}
