//! Translation template extraction
//!
//! Scans source files for calls to `tr` and `tr_fmt` whose first argument
//! is a string literal and writes the collected msgids as a `.pot` template.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local};
use regex::Regex;

use super::error::{CatalogError, Result};
use super::po::escape;

/// Captures the string literal passed as first argument to `tr` / `tr_fmt`
pub const DEFAULT_PATTERN: &str = r#"\btr(?:_fmt)?\s*\(\s*"((?:[^"\\]|\\[\s\S])*)""#;

/// Directories never descended into
const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

/// Where a msgid was found
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceRef {
    pub file: PathBuf,
    pub line: usize,
}

/// An extracted msgid with its source references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub msgid: String,
    pub references: Vec<SourceRef>,
}

/// Regex-based msgid extractor
#[derive(Debug, Clone)]
pub struct Extractor {
    pattern: Regex,
    extensions: Vec<String>,
    skip_files: Vec<String>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_PATTERN).expect("default pattern is valid"),
            extensions: vec!["rs".to_string()],
            skip_files: Vec::new(),
        }
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom pattern; capture group 1 must be the literal body
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.pattern = Regex::new(pattern)?;
        Ok(self)
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Skip files with this exact file name
    pub fn skip_file(mut self, name: impl Into<String>) -> Self {
        self.skip_files.push(name.into());
        self
    }

    /// Walk `root` and collect every msgid, sorted and de-duplicated
    pub fn extract_dir(&self, root: &Path) -> Result<Vec<Message>> {
        let mut found = BTreeMap::new();
        let mut files = Vec::new();
        self.collect_files(root, &mut files)?;
        files.sort();

        for path in &files {
            let content = fs::read_to_string(path)
                .map_err(|e| CatalogError::from(e).in_file(path))?;
            let label = path.strip_prefix(root).unwrap_or(path);
            self.extract_source(label, &content, &mut found);
        }

        tracing::debug!(
            "Extracted {} strings from {} files under {}",
            found.len(),
            files.len(),
            root.display()
        );

        Ok(into_messages(found))
    }

    /// Collect msgids from one file's contents
    pub fn extract_source(
        &self,
        file: &Path,
        content: &str,
        found: &mut BTreeMap<String, Vec<SourceRef>>,
    ) {
        for caps in self.pattern.captures_iter(content) {
            let Some(m) = caps.get(1) else { continue };
            let line = content[..m.start()].matches('\n').count() + 1;
            let msgid = unescape_literal(m.as_str());
            if msgid.is_empty() {
                continue;
            }
            found.entry(msgid).or_default().push(SourceRef {
                file: file.to_path_buf(),
                line,
            });
        }
    }

    fn collect_files(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|e| CatalogError::from(e).in_file(dir))?;

        for entry in entries {
            let entry = entry?;
            // Symlinks are never followed
            let file_type = entry.file_type()?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            if file_type.is_dir() {
                if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_str()) {
                    continue;
                }
                self.collect_files(&path, files)?;
            } else if file_type.is_file() && self.wants(&path, &name) {
                files.push(path);
            }
        }

        Ok(())
    }

    fn wants(&self, path: &Path, name: &str) -> bool {
        if self.skip_files.iter().any(|s| s == name) {
            return false;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|want| want == ext))
    }
}

fn into_messages(found: BTreeMap<String, Vec<SourceRef>>) -> Vec<Message> {
    found
        .into_iter()
        .map(|(msgid, mut references)| {
            references.sort();
            references.dedup();
            Message { msgid, references }
        })
        .collect()
}

/// Decode the escapes of a Rust string literal body
fn unescape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some('\n') => {
                // Line continuation swallows leading whitespace
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Render a `.pot` template
pub fn render_pot(messages: &[Message], created: DateTime<Local>) -> String {
    let mut out = String::new();

    out.push_str("# PDF Converter Translation Template\n");
    let _ = writeln!(
        out,
        "# Copyright (C) {} Technology Entertainment Studio",
        created.year()
    );
    out.push_str("msgid \"\"\n");
    out.push_str("msgstr \"\"\n");
    out.push_str("\"Content-Type: text/plain; charset=UTF-8\\n\"\n");
    out.push_str("\"Content-Transfer-Encoding: 8bit\\n\"\n");
    let _ = writeln!(
        out,
        "\"POT-Creation-Date: {}\\n\"",
        created.format("%Y-%m-%d %H:%M%z")
    );
    out.push('\n');

    for message in messages {
        if !message.references.is_empty() {
            let refs: Vec<String> = message
                .references
                .iter()
                .map(|r| format!("{}:{}", r.file.display().to_string().replace('\\', "/"), r.line))
                .collect();
            let _ = writeln!(out, "#: {}", refs.join(" "));
        }
        let _ = writeln!(out, "msgid \"{}\"", escape(&message.msgid));
        out.push_str("msgstr \"\"\n\n");
    }

    out
}

/// Write a `.pot` template to disk, creating parent directories
pub fn write_pot(messages: &[Message], output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, render_pot(messages, Local::now()))
        .map_err(|e| CatalogError::from(e).in_file(output))?;

    tracing::info!("Generated {} with {} strings", output.display(), messages.len());
    Ok(())
}
