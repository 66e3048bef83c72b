//! Configuration management for PDF Converter
//!
//! Settings live in `config.toml` inside the per-user application data
//! directory. A missing file or missing keys fall back to defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const APP_NAME: &str = "PDF Converter";
pub const VENDOR_NAME: &str = "Technology Entertainment Studio";
pub const CONFIG_FILE: &str = "config.toml";

/// Overrides the application data directory
pub const ENV_HOME: &str = "PDF_CONVERTER_HOME";
/// Overrides the language for the current process
pub const ENV_LANG: &str = "PDF_CONVERTER_LANG";
/// Overrides the locales directory
pub const ENV_LOCALES: &str = "PDF_CONVERTER_LOCALES";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No application data directory (set APPDATA, HOME or {})", ENV_HOME)]
    NoDataDir,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// UI language code
    pub language: String,
    /// Locales directory; resolved next to the executable when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locales_dir: Option<PathBuf>,
    /// Pages rendered by `preview`
    pub preview_pages: usize,
    /// Preview width in pixels
    pub preview_width: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            language: "en".to_string(),
            locales_dir: None,
            preview_pages: 5,
            preview_width: 600,
        }
    }
}

impl Config {
    /// Apply process-level environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(lang) = env::var(ENV_LANG) {
            if !lang.trim().is_empty() {
                self.general.language = lang.trim().to_string();
            }
        }
        if let Ok(dir) = env::var(ENV_LOCALES) {
            if !dir.trim().is_empty() {
                self.general.locales_dir = Some(PathBuf::from(dir.trim()));
            }
        }
        self
    }
}

/// Per-user application data directory
///
/// `$PDF_CONVERTER_HOME`, else `$APPDATA/<vendor>/<app>`, else
/// `<home>/<vendor>/<app>`. Created if missing.
pub fn app_data_dir() -> Result<PathBuf> {
    let dir = match env::var_os(ENV_HOME) {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base = env::var_os("APPDATA")
                .or_else(|| env::var_os("HOME"))
                .or_else(|| env::var_os("USERPROFILE"))
                .map(PathBuf::from)
                .ok_or(ConfigError::NoDataDir)?;
            base.join(VENDOR_NAME).join(APP_NAME)
        }
    };

    fs::create_dir_all(&dir).map_err(|source| ConfigError::Io {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(app_data_dir()?.join(CONFIG_FILE))
}

/// Reads and writes one config file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn open_default() -> Result<Self> {
        Ok(Self::at(config_path()?))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the config; a missing file yields defaults
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            tracing::debug!("No config at {}, using defaults", self.path.display());
            return Ok(Config::default());
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let raw = toml::to_string_pretty(config)?;
        fs::write(&self.path, raw).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!("Saved config to {}", self.path.display());
        Ok(())
    }

    /// Configured language, `en` when unset
    pub fn language(&self) -> Result<String> {
        Ok(self.load()?.general.language)
    }

    pub fn set_language(&self, lang: &str) -> Result<()> {
        let mut config = self.load()?;
        config.general.language = lang.to_string();
        self.save(&config)
    }
}
