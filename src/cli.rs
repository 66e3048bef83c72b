//! Command-line interface definition

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::document::OutputFormat;
use crate::preview::{DEFAULT_MAX_PAGES, DEFAULT_WIDTH};

#[derive(Debug, Parser)]
#[command(
    name = "pdf-converter",
    about = "Preview PDF files and convert them to TXT, HTML or DOCX",
    version
)]
pub struct Cli {
    /// UI language for this run (overrides the saved setting)
    #[arg(long, global = true, value_name = "CODE")]
    pub lang: Option<String>,

    /// Directory holding compiled catalogs
    #[arg(long, global = true, value_name = "DIR")]
    pub locales: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show document metadata and page sizes.
    Info(InfoArgs),

    /// Render or print the first pages of a document.
    Preview(PreviewArgs),

    /// Convert one or more PDF files.
    Convert(ConvertArgs),

    /// Show or change the interface language.
    #[command(subcommand)]
    Lang(LangCommand),

    /// Maintain translation catalogs.
    #[command(subcommand)]
    I18n(I18nCommand),

    /// Check the settings file and the active catalog.
    Doctor(DoctorArgs),
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    pub file: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    pub file: PathBuf,

    /// Number of pages to show
    #[arg(long, value_name = "N")]
    pub pages: Option<usize>,

    /// Image width in pixels
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    /// Directory for the PNG files
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Print extracted text instead of rendering images
    #[arg(long)]
    pub text: bool,
}

impl PreviewArgs {
    pub fn pages_or(&self, configured: usize) -> usize {
        self.pages.unwrap_or(if configured == 0 {
            DEFAULT_MAX_PAGES
        } else {
            configured
        })
    }

    pub fn width_or(&self, configured: u32) -> u32 {
        self.width.unwrap_or(if configured == 0 {
            DEFAULT_WIDTH
        } else {
            configured
        })
    }
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Target format: txt, html or docx
    #[arg(long = "to", short = 't', default_value_t = OutputFormat::Txt)]
    pub format: OutputFormat,

    /// Output file (single input only)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit progress events as JSON lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum LangCommand {
    /// List languages with a compiled catalog.
    List,
    /// Print the saved language.
    Get,
    /// Save the interface language.
    Set {
        code: String,
        /// Save even if no catalog exists for the language
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum I18nCommand {
    /// Extract translatable strings into a template.
    Extract {
        /// Source directory to scan
        #[arg(long, default_value = "src")]
        src: PathBuf,
        /// Template path (default: <locales>/messages.pot)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Compile .po catalogs to .mo.
    Compile {
        /// Catalogs to compile (default: every language under the locales directory)
        files: Vec<PathBuf>,
    },
    /// Extract, then compile every language.
    Build {
        #[arg(long, default_value = "src")]
        src: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct DoctorArgs {
    #[arg(long)]
    pub json: bool,
}
