//! Catalog error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while extracting, parsing or compiling catalogs
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Malformed `.po` input
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Malformed `.mo` input
    #[error("Invalid catalog: {0}")]
    InvalidFormat(String),

    /// Bad extraction regex
    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Error attributed to a specific file
    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<CatalogError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        CatalogError::Syntax {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        CatalogError::InFile {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
