//! Runtime internationalization
//!
//! Compiled catalogs live under a locales directory:
//!
//! ```text
//! locales/
//!   messages.pot
//!   vi/LC_MESSAGES/messages.po
//!   vi/LC_MESSAGES/messages.mo
//! ```
//!
//! English is the source language and always maps to the identity
//! catalog. Any other language whose compiled catalog is missing or broken
//! also falls back to identity, so user-facing strings are never lost.
//!
//! The active catalog is process-global; [`tr`] and [`tr_fmt`] read it.

mod translations;

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::catalog::{self, CatalogError};

pub use translations::Translations;

/// Source language of every msgid
pub const SOURCE_LANGUAGE: &str = "en";

/// A directory of per-language catalogs
#[derive(Debug, Clone)]
pub struct Locales {
    dir: PathBuf,
}

impl Locales {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Pick the locales directory
    ///
    /// An explicit directory wins; otherwise `locales/` next to the
    /// executable if it exists, else `./locales`.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        if let Some(dir) = explicit {
            return Self::new(dir);
        }

        let beside_exe = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.join("locales")))
            .filter(|dir| dir.is_dir());

        Self::new(beside_exe.unwrap_or_else(|| PathBuf::from("locales")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn catalog_path(&self, lang: &str) -> PathBuf {
        catalog::catalog_path(&self.dir, lang, "mo")
    }

    /// First compiled catalog among the [`language_candidates`] of `lang`
    pub fn find_catalog(&self, lang: &str) -> Option<PathBuf> {
        language_candidates(lang)
            .iter()
            .map(|candidate| self.catalog_path(candidate))
            .find(|path| path.is_file())
    }

    /// Language codes with a compiled catalog, plus English, sorted
    pub fn available(&self) -> Vec<String> {
        let mut langs = vec![SOURCE_LANGUAGE.to_string()];

        if let Ok(entries) = std::fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                if !entry.path().is_dir() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                if name != SOURCE_LANGUAGE && self.catalog_path(&name).is_file() {
                    langs.push(name);
                }
            }
        }

        langs.sort();
        langs
    }

    /// Load a language, propagating catalog errors
    pub fn try_load(&self, lang: &str) -> Result<Translations, CatalogError> {
        if is_source_language(lang) {
            return Ok(Translations::identity());
        }
        let path = self
            .find_catalog(lang)
            .unwrap_or_else(|| self.catalog_path(lang));
        Translations::open(&path)
    }

    /// Load a language, falling back to identity on any failure
    pub fn load(&self, lang: &str) -> Translations {
        if is_source_language(lang) {
            return Translations::identity();
        }

        let Some(path) = self.find_catalog(lang) else {
            let path = self.catalog_path(lang);
            tracing::debug!(
                "Translation file not found for {} at {}, falling back to English",
                lang,
                path.display()
            );
            return Translations::identity();
        };

        match Translations::open(&path) {
            Ok(t) => {
                tracing::debug!("Loaded {} translations for {}", t.len(), lang);
                t
            }
            Err(e) => {
                tracing::warn!("Error loading translation for {}: {}", lang, e);
                Translations::identity()
            }
        }
    }
}

/// Catalog names tried for a language code, most specific first
///
/// `vi_VN.UTF-8` yields `vi_VN.UTF-8`, `vi_VN` and `vi`; a `@modifier`
/// is dropped the same way as a charset.
pub fn language_candidates(code: &str) -> Vec<String> {
    let code = code.trim();
    let without_charset = code.split(['.', '@']).next().unwrap_or(code);
    let language = without_charset
        .split(['_', '-'])
        .next()
        .unwrap_or(without_charset);

    let mut candidates: Vec<String> = Vec::with_capacity(3);
    for candidate in [code, without_charset, language] {
        if !candidate.is_empty() && !candidates.iter().any(|c| c == candidate) {
            candidates.push(candidate.to_string());
        }
    }
    candidates
}

/// Whether `code` names a variant of the source language
pub fn is_source_language(code: &str) -> bool {
    language_candidates(code)
        .last()
        .is_some_and(|lang| lang == SOURCE_LANGUAGE)
}

static ACTIVE: OnceLock<RwLock<Arc<Translations>>> = OnceLock::new();

fn active() -> &'static RwLock<Arc<Translations>> {
    ACTIVE.get_or_init(|| RwLock::new(Arc::new(Translations::identity())))
}

/// Replace the active catalog
pub fn install(translations: Translations) {
    *active().write() = Arc::new(translations);
}

/// The active catalog
pub fn current() -> Arc<Translations> {
    active().read().clone()
}

/// Load and install `lang` from `locales`
pub fn init(locales: &Locales, lang: &str) {
    install(locales.load(lang));
}

/// Translate a message with the active catalog
pub fn tr(msgid: &str) -> String {
    current().gettext(msgid).to_string()
}

/// Translate a message, then substitute `{name}` placeholders
pub fn tr_fmt(msgid: &str, args: &[(&str, &dyn fmt::Display)]) -> String {
    format_named(current().gettext(msgid), args)
}

/// Substitute `{name}` placeholders; unknown placeholders are left as-is
pub fn format_named(template: &str, args: &[(&str, &dyn fmt::Display)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let replaced = after.find('}').and_then(|end| {
            let name = &after[..end];
            args.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (value.to_string(), end))
        });

        match replaced {
            Some((value, end)) => {
                out.push_str(&value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
