//! Translation catalog tool-chain
//!
//! ```text
//!   source files ──extract──► messages.pot ──(translator)──► <lang>.po ──compile──► messages.mo
//!        pot::Extractor          pot::write_pot                po::PoFile           mo::encode
//! ```
//!
//! The runtime side that loads compiled catalogs lives in [`crate::i18n`].

mod error;
pub mod mo;
pub mod po;
pub mod pot;

use std::fs;
use std::path::{Path, PathBuf};

pub use error::{CatalogError, Result};
pub use po::{PoEntry, PoFile};
pub use pot::{Extractor, Message, SourceRef};

/// Catalog domain, file stem of every `.po` / `.mo` / `.pot`
pub const DOMAIN: &str = "messages";

/// `<locales>/<lang>/LC_MESSAGES/messages.<ext>`
pub fn catalog_path(locales_dir: &Path, lang: &str, ext: &str) -> PathBuf {
    locales_dir
        .join(lang)
        .join("LC_MESSAGES")
        .join(format!("{}.{}", DOMAIN, ext))
}

/// Compile one `.po` file into a `.mo` file, returning the entry count
pub fn compile_po_file(po_path: &Path, mo_path: &Path) -> Result<usize> {
    let source = fs::read_to_string(po_path).map_err(|e| CatalogError::from(e).in_file(po_path))?;
    let po = PoFile::parse(&source).map_err(|e| e.in_file(po_path))?;
    let messages = po.messages();

    if let Some(parent) = mo_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(mo_path, mo::encode(&messages)).map_err(|e| CatalogError::from(e).in_file(mo_path))?;

    tracing::info!(
        "Compiled {} -> {} ({} entries)",
        po_path.display(),
        mo_path.display(),
        messages.len()
    );
    Ok(messages.len())
}

/// Outcome of [`build_locales`]
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub template: PathBuf,
    pub extracted: usize,
    /// `(language, entries)` per compiled catalog
    pub compiled: Vec<(String, usize)>,
}

/// Regenerate the template and compile every language catalog
///
/// Extracts msgids from `source_dir` into `<locales>/messages.pot`, then
/// compiles each `<locales>/<lang>/LC_MESSAGES/messages.po` found.
pub fn build_locales(locales_dir: &Path, source_dir: &Path) -> Result<BuildReport> {
    let messages = Extractor::new().extract_dir(source_dir)?;
    let template = locales_dir.join(format!("{}.pot", DOMAIN));
    pot::write_pot(&messages, &template)?;

    let mut languages: Vec<String> = fs::read_dir(locales_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    languages.sort();

    let mut compiled = Vec::new();
    for lang in languages {
        let po_path = catalog_path(locales_dir, &lang, "po");
        if !po_path.is_file() {
            continue;
        }
        let count = compile_po_file(&po_path, &catalog_path(locales_dir, &lang, "mo"))?;
        compiled.push((lang, count));
    }

    Ok(BuildReport {
        template,
        extracted: messages.len(),
        compiled,
    })
}
