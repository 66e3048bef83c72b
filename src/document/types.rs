//! Core document types
//!
//! Page geometry and extracted text shared by preview and conversion.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Input document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
}

impl DocumentFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Detect format from magic bytes
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF") {
            return Some(Self::Pdf);
        }
        None
    }
}

/// Conversion target format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Html,
    Docx,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Txt, OutputFormat::Html, OutputFormat::Docx];

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Html => "html",
            OutputFormat::Docx => "docx",
        }
    }

    /// Upper-case label shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "TXT",
            OutputFormat::Html => "HTML",
            OutputFormat::Docx => "DOCX",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" => Ok(OutputFormat::Txt),
            "html" | "htm" => Ok(OutputFormat::Html),
            "docx" => Ok(OutputFormat::Docx),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// Axis-aligned rectangle in PDF points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

pub type BoundingBox = Rect;

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// Document summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub path: PathBuf,
    /// Title from the info dictionary, or the file stem
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub page_count: usize,
    pub pages: Vec<PageSize>,
}

/// Extracted text of one page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageText {
    /// Zero-based page index
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub blocks: Vec<TextBlock>,
}

impl PageText {
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.lines.is_empty())
    }
}

/// Text block (paragraph, heading, etc.)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBlock {
    pub bbox: BoundingBox,
    pub lines: Vec<TextLine>,
}

/// Text line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLine {
    pub bbox: BoundingBox,
    pub text: String,
    /// Size of the first glyph on the line
    pub font_size: f32,
}

/// A page rendered to PNG
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}
