//! PDF conversion
//!
//! A [`Converter`] turns extracted page text into one output format. The
//! MuPDF work (text extraction) happens in [`convert`], which feeds every
//! page to the converter and writes the result atomically.
//!
//! [`ConversionJob`] runs the same pipeline on a blocking worker and
//! streams [`ConversionEvent`]s back to the caller.

mod docx;
mod html;
mod job;
mod txt;

use std::fs;
use std::path::{Path, PathBuf};

use crate::document::{DocumentInfo, DocumentResult, OutputFormat, PageSource, PageText};

pub use docx::DocxConverter;
pub use html::HtmlConverter;
pub use job::{ConversionEvent, ConversionJob, JobHandle};
pub use txt::TxtConverter;

/// Renders extracted pages into an output document
pub trait Converter: Send + Sync {
    fn format(&self) -> OutputFormat;

    /// Produce the complete output file contents
    fn render(&self, info: &DocumentInfo, pages: &[PageText]) -> DocumentResult<Vec<u8>>;
}

/// Converter for a target format
pub fn converter_for(format: OutputFormat) -> Box<dyn Converter> {
    match format {
        OutputFormat::Txt => Box::new(TxtConverter),
        OutputFormat::Html => Box::new(HtmlConverter),
        OutputFormat::Docx => Box::new(DocxConverter),
    }
}

/// `report.pdf` -> `report.<ext>` in the same directory
pub fn output_path_for(input: &Path, format: OutputFormat) -> PathBuf {
    input.with_extension(format.extension())
}

/// Extract every page from `source`, render it and write `output`
///
/// `on_page(done, total)` is called after each page is extracted. The
/// output is written to a sibling `.part` file and renamed into place, so a
/// failure never leaves a truncated target behind.
pub fn convert<S, F>(
    source: &S,
    format: OutputFormat,
    output: &Path,
    mut on_page: F,
) -> DocumentResult<PathBuf>
where
    S: PageSource + ?Sized,
    F: FnMut(usize, usize),
{
    let info = source.info()?;
    let total = source.page_count();

    let mut pages = Vec::with_capacity(total);
    for index in 0..total {
        pages.push(source.page_text(index)?);
        on_page(index + 1, total);
    }

    let bytes = converter_for(format).render(&info, &pages)?;
    write_atomically(output, &bytes)?;

    tracing::info!(
        "Converted {} -> {} ({} pages, {} bytes)",
        info.path.display(),
        output.display(),
        total,
        bytes.len()
    );
    Ok(output.to_path_buf())
}

fn write_atomically(output: &Path, bytes: &[u8]) -> DocumentResult<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut partial = output.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    // A failed write or rename never leaves the partial file behind
    let written = fs::write(&partial, bytes).and_then(|()| fs::rename(&partial, output));
    if let Err(e) = written {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }
    Ok(())
}
