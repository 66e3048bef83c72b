//! Installation diagnostics
//!
//! Checks the settings file and the catalog of the configured language,
//! reporting problems instead of failing on them.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::ConfigStore;
use crate::i18n::{self, Locales, Translations, SOURCE_LANGUAGE};

/// Looked up in the active catalog to show a translation works
pub const SAMPLE_MSGID: &str = "Convert";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorReport {
    pub version: &'static str,
    pub working_dir: Option<PathBuf>,
    pub config_path: PathBuf,
    pub config_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_error: Option<String>,
    pub language: String,
    pub locales_dir: PathBuf,
    pub available_languages: Vec<String>,
    /// `None` for the source language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogCheck>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCheck {
    pub path: PathBuf,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Translation of [`SAMPLE_MSGID`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,
}

impl DoctorReport {
    pub fn is_healthy(&self) -> bool {
        self.config_error.is_none()
            && self
                .catalog
                .as_ref()
                .map_or(true, |c| c.found && c.error.is_none())
    }
}

/// Inspect the config file and the configured language's catalog
///
/// `language` overrides the configured language when given.
pub fn run(store: &ConfigStore, locales: &Locales, language: Option<&str>) -> DoctorReport {
    let (configured, config_error) = match store.load() {
        Ok(config) => (config.general.language, None),
        Err(e) => (SOURCE_LANGUAGE.to_string(), Some(e.to_string())),
    };
    let language = language.map(str::to_string).unwrap_or(configured);

    let catalog =
        (!i18n::is_source_language(&language)).then(|| check_catalog(locales, &language));

    DoctorReport {
        version: env!("CARGO_PKG_VERSION"),
        working_dir: std::env::current_dir().ok(),
        config_path: store.path().to_path_buf(),
        config_exists: store.exists(),
        config_error,
        language,
        locales_dir: locales.dir().to_path_buf(),
        available_languages: locales.available(),
        catalog,
    }
}

fn check_catalog(locales: &Locales, language: &str) -> CatalogCheck {
    let path = locales
        .find_catalog(language)
        .unwrap_or_else(|| locales.catalog_path(language));
    let mut check = CatalogCheck {
        found: path.is_file(),
        path,
        entries: None,
        error: None,
        sample: None,
    };

    if !check.found {
        return check;
    }

    match Translations::open(&check.path) {
        Ok(t) => {
            check.entries = Some(t.len());
            check.sample = Some(t.gettext(SAMPLE_MSGID).to_string());
        }
        Err(e) => check.error = Some(e.to_string()),
    }
    check
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Diagnostic Start ---")?;
        writeln!(f, "Version: {}", self.version)?;
        if let Some(cwd) = &self.working_dir {
            writeln!(f, "CWD: {}", cwd.display())?;
        }

        writeln!(f, "Config Path: {}", self.config_path.display())?;
        if self.config_exists {
            writeln!(f, "Config file exists.")?;
        } else {
            writeln!(f, "Config file missing, defaults in use.")?;
        }
        if let Some(err) = &self.config_error {
            writeln!(f, "Error reading config: {}", err)?;
        }
        writeln!(f, "Current Configured Language: '{}'", self.language)?;

        writeln!(f, "Locales: {}", self.locales_dir.display())?;
        writeln!(f, "Available: {}", self.available_languages.join(", "))?;

        match &self.catalog {
            None => writeln!(f, "Language is '{}'. Using the built-in strings.", SOURCE_LANGUAGE)?,
            Some(c) => {
                writeln!(f, "Checking catalog: {}", c.path.display())?;
                if !c.found {
                    writeln!(f, "Catalog NOT FOUND. Run `pdf-converter i18n build`.")?;
                } else if let Some(err) = &c.error {
                    writeln!(f, "!!! CATALOG ERROR !!!")?;
                    writeln!(f, "{}", err)?;
                } else {
                    writeln!(f, "Catalog is VALID.")?;
                    if let Some(n) = c.entries {
                        writeln!(f, "Entry count: {}", n)?;
                    }
                    if let Some(sample) = &c.sample {
                        writeln!(f, "Sample '{}': {}", SAMPLE_MSGID, sample)?;
                    }
                }
            }
        }

        write!(f, "--- Diagnostic End ---")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{catalog_path, mo};
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ConfigStore, Locales) {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::at(temp_dir.path().join("config.toml"));
        let locales = Locales::new(temp_dir.path().join("locales"));
        (temp_dir, store, locales)
    }

    #[test]
    fn test_english_needs_no_catalog() {
        let (_temp_dir, store, locales) = setup();
        let report = run(&store, &locales, None);

        assert!(!report.config_exists);
        assert_eq!(report.language, "en");
        assert!(report.catalog.is_none());
        assert!(report.is_healthy());
        assert!(report.to_string().contains("Using the built-in strings"));
    }

    #[test]
    fn test_missing_catalog_is_unhealthy() {
        let (_temp_dir, store, locales) = setup();
        store.set_language("vi").unwrap();

        let report = run(&store, &locales, None);
        assert!(report.config_exists);
        let catalog = report.catalog.as_ref().unwrap();
        assert!(!catalog.found);
        assert!(!report.is_healthy());
        assert!(report.to_string().contains("Catalog NOT FOUND"));
    }

    #[test]
    fn test_valid_catalog_sample() {
        let (temp_dir, store, locales) = setup();
        let mut messages = BTreeMap::new();
        messages.insert("Convert".to_string(), "Chuyển đổi".to_string());
        let path = catalog_path(&temp_dir.path().join("locales"), "vi", "mo");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, mo::encode(&messages)).unwrap();

        let report = run(&store, &locales, Some("vi"));
        let catalog = report.catalog.as_ref().unwrap();
        assert_eq!(catalog.entries, Some(1));
        assert_eq!(catalog.sample.as_deref(), Some("Chuyển đổi"));
        assert!(report.is_healthy());
        assert_eq!(report.available_languages, vec!["en", "vi"]);
    }

    #[test]
    fn test_regional_code_checks_language_catalog() {
        let (_temp_dir, store, locales) = setup();
        let mut messages = BTreeMap::new();
        messages.insert("Convert".to_string(), "Chuyển đổi".to_string());
        let path = locales.catalog_path("vi");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, mo::encode(&messages)).unwrap();

        let report = run(&store, &locales, Some("vi_VN.UTF-8"));
        let catalog = report.catalog.as_ref().unwrap();
        assert_eq!(catalog.path, path);
        assert_eq!(catalog.sample.as_deref(), Some("Chuyển đổi"));
        assert!(report.is_healthy());

        assert!(run(&store, &locales, Some("en_US")).catalog.is_none());
    }

    #[test]
    fn test_corrupt_catalog_and_config() {
        let (temp_dir, store, locales) = setup();
        fs::write(store.path(), "[general\n").unwrap();
        let path = locales.catalog_path("de");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"broken").unwrap();

        let report = run(&store, &locales, Some("de"));
        assert!(report.config_error.is_some());
        assert!(report.catalog.as_ref().unwrap().error.is_some());
        assert!(!report.is_healthy());
        drop(temp_dir);
    }
}
