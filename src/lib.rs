//! PDF Converter
//!
//! Opens PDF files through MuPDF, previews their first pages and converts
//! them to plain text, positioned HTML or DOCX. The interface is localized
//! with gettext catalogs, compiled by the tool-chain in [`catalog`].
//!
//! # Modules
//!
//! - `document`: Page geometry, extracted text and the `PageSource` seam
//! - `mupdf`: Thread-safe MuPDF access
//! - `preview`: First-page rendering and text previews
//! - `convert`: TXT / HTML / DOCX writers and background jobs
//! - `config`: Persistent settings
//! - `i18n`: Runtime translation lookups
//! - `catalog`: POT extraction, PO parsing and MO compilation
//! - `diagnostics`: The `doctor` report

pub mod catalog;
pub mod cli;
pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod document;
pub mod i18n;
pub mod mupdf;
pub mod preview;

pub use i18n::{tr, tr_fmt};
