//! `.po` catalog parser
//!
//! Line-oriented reader for the subset of the gettext PO syntax that
//! translators produce by hand or with common editors:
//!
//! ```text
//! #, fuzzy
//! msgctxt "menu"
//! msgid "Open"
//! msgstr ""
//! "Mở"
//! ```
//!
//! Comments other than `#,` flag lines are ignored. A `msgctxt` or `msgid`
//! keyword starts a new entry.

use std::collections::BTreeMap;

use super::error::{CatalogError, Result};

/// Separator between context and msgid in compiled keys
pub const CONTEXT_SEPARATOR: char = '\u{4}';
/// Separator between plural forms in compiled keys and values
pub const PLURAL_SEPARATOR: char = '\0';

/// A single catalog entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoEntry {
    pub context: Option<String>,
    pub msgid: String,
    pub msgid_plural: Option<String>,
    /// `msgstr` or `msgstr[0..n]`
    pub msgstr: Vec<String>,
    pub fuzzy: bool,
}

impl PoEntry {
    /// The `msgid ""` entry carrying catalog metadata
    pub fn is_header(&self) -> bool {
        self.msgid.is_empty() && self.context.is_none()
    }

    pub fn is_translated(&self) -> bool {
        self.msgstr.first().is_some_and(|s| !s.is_empty())
    }

    /// Lookup key as stored in a compiled catalog
    pub fn key(&self) -> String {
        let mut key = String::new();
        if let Some(ctx) = &self.context {
            key.push_str(ctx);
            key.push(CONTEXT_SEPARATOR);
        }
        key.push_str(&self.msgid);
        if let Some(plural) = &self.msgid_plural {
            key.push(PLURAL_SEPARATOR);
            key.push_str(plural);
        }
        key
    }

    /// Translation as stored in a compiled catalog
    pub fn value(&self) -> String {
        self.msgstr.join(&PLURAL_SEPARATOR.to_string())
    }
}

/// Parsed `.po` file
#[derive(Debug, Clone, Default)]
pub struct PoFile {
    pub entries: Vec<PoEntry>,
}

impl PoFile {
    pub fn parse(source: &str) -> Result<Self> {
        Parser::default().run(source)
    }

    pub fn header(&self) -> Option<&PoEntry> {
        self.entries.iter().find(|e| e.is_header())
    }

    /// Entries that end up in a compiled catalog
    ///
    /// The header is always kept. Untranslated and fuzzy entries are
    /// dropped. A repeated key keeps the last occurrence.
    pub fn messages(&self) -> BTreeMap<String, String> {
        let mut messages = BTreeMap::new();

        for entry in &self.entries {
            if entry.is_header() {
                messages.insert(String::new(), entry.value());
                continue;
            }
            if entry.fuzzy || !entry.is_translated() {
                continue;
            }
            messages.insert(entry.key(), entry.value());
        }

        messages
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Context,
    Id,
    IdPlural,
    Str(usize),
}

#[derive(Default)]
struct Parser {
    entries: Vec<PoEntry>,
    current: PoEntry,
    has_id: bool,
    field: Option<Field>,
}

impl Parser {
    fn run(mut self, source: &str) -> Result<PoFile> {
        for (idx, raw) in source.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            if line.is_empty() {
                continue;
            }

            if let Some(flags) = line.strip_prefix("#,") {
                self.flush();
                if flags.split(',').any(|f| f.trim() == "fuzzy") {
                    self.current.fuzzy = true;
                }
                continue;
            }

            if line.starts_with('#') {
                continue;
            }

            if line.starts_with('"') {
                let text = parse_quoted(line).map_err(|m| CatalogError::syntax(line_no, m))?;
                let field = self
                    .field
                    .ok_or_else(|| CatalogError::syntax(line_no, "string without a keyword"))?;
                self.append(field, &text);
                continue;
            }

            let (keyword, rest) = line
                .split_once(|c: char| c.is_whitespace())
                .ok_or_else(|| CatalogError::syntax(line_no, format!("expected a string after '{}'", line)))?;
            let text = parse_quoted(rest.trim()).map_err(|m| CatalogError::syntax(line_no, m))?;

            match keyword {
                "msgctxt" => {
                    if self.has_id || self.current.context.is_some() {
                        self.flush();
                    }
                    self.current.context = Some(text);
                    self.field = Some(Field::Context);
                }
                "msgid" => {
                    if self.has_id {
                        self.flush();
                    }
                    self.has_id = true;
                    self.current.msgid = text;
                    self.field = Some(Field::Id);
                }
                "msgid_plural" => {
                    self.require_id(line_no, keyword)?;
                    self.current.msgid_plural = Some(text);
                    self.field = Some(Field::IdPlural);
                }
                "msgstr" => {
                    self.require_id(line_no, keyword)?;
                    self.set_str(0, text);
                }
                other => {
                    let index = other
                        .strip_prefix("msgstr[")
                        .and_then(|s| s.strip_suffix(']'))
                        .and_then(|n| n.parse::<usize>().ok())
                        .ok_or_else(|| {
                            CatalogError::syntax(line_no, format!("unknown keyword '{}'", other))
                        })?;
                    self.require_id(line_no, "msgstr[]")?;
                    self.set_str(index, text);
                }
            }
        }

        self.flush();
        Ok(PoFile {
            entries: self.entries,
        })
    }

    fn require_id(&self, line_no: usize, keyword: &str) -> Result<()> {
        if !self.has_id {
            return Err(CatalogError::syntax(
                line_no,
                format!("'{}' before msgid", keyword),
            ));
        }
        Ok(())
    }

    fn set_str(&mut self, index: usize, text: String) {
        let strs = &mut self.current.msgstr;
        if strs.len() <= index {
            strs.resize(index + 1, String::new());
        }
        strs[index] = text;
        self.field = Some(Field::Str(index));
    }

    fn append(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Context => self.current.context.get_or_insert_with(String::new),
            Field::Id => &mut self.current.msgid,
            Field::IdPlural => self.current.msgid_plural.get_or_insert_with(String::new),
            Field::Str(i) => &mut self.current.msgstr[i],
        };
        target.push_str(text);
    }

    fn flush(&mut self) {
        let entry = std::mem::take(&mut self.current);
        if self.has_id {
            self.entries.push(entry);
        } else if entry.context.is_some() {
            tracing::debug!("Dropping msgctxt without msgid: {:?}", entry.context);
        }
        self.has_id = false;
        self.field = None;
    }
}

/// Decode a `"..."` literal, resolving C-style escapes
fn parse_quoted(s: &str) -> std::result::Result<String, String> {
    let inner = s
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| format!("expected a quoted string, found '{}'", s))?;

    let trailing = inner.chars().rev().take_while(|&c| c == '\\').count();
    if trailing % 2 == 1 {
        return Err("unterminated string".to_string());
    }

    Ok(unescape(inner))
}

pub(crate) fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Inverse of [`unescape`] for writing catalogs
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Vietnamese translation
msgid \"\"
msgstr \"\"
\"Language: vi\\n\"
\"Content-Type: text/plain; charset=UTF-8\\n\"

#: src/main.rs:10
msgid \"Convert\"
msgstr \"Chuyển đổi\"

msgid \"Ready\"
msgstr \"\"

msgid \"Saved successfully to:\"
msgstr \"\"
\"Đã lưu \"
\"thành công:\"
";

    #[test]
    fn test_parse_header_and_entries() {
        let po = PoFile::parse(SAMPLE).unwrap();
        assert_eq!(po.entries.len(), 4);

        let header = po.header().unwrap();
        assert_eq!(
            header.value(),
            "Language: vi\nContent-Type: text/plain; charset=UTF-8\n"
        );
        assert_eq!(po.entries[1].msgstr, vec!["Chuyển đổi".to_string()]);
        assert_eq!(po.entries[3].value(), "Đã lưu thành công:");
    }

    #[test]
    fn test_messages_skip_untranslated() {
        let messages = PoFile::parse(SAMPLE).unwrap().messages();
        assert_eq!(messages.len(), 3);
        assert!(messages.contains_key(""));
        assert!(messages.contains_key("Convert"));
        assert!(!messages.contains_key("Ready"));
    }

    #[test]
    fn test_fuzzy_entries_dropped() {
        let src = "#, fuzzy\nmsgid \"Open\"\nmsgstr \"Mở\"\n\nmsgid \"Close\"\nmsgstr \"Đóng\"\n";
        let po = PoFile::parse(src).unwrap();
        assert!(po.entries[0].fuzzy);
        assert!(!po.entries[1].fuzzy);

        let messages = po.messages();
        assert!(!messages.contains_key("Open"));
        assert_eq!(messages.get("Close").map(String::as_str), Some("Đóng"));
    }

    #[test]
    fn test_escapes() {
        let src = "msgid \"Line\\none \\\"quoted\\\"\\tend\\\\\"\nmsgstr \"x\"\n";
        let po = PoFile::parse(src).unwrap();
        assert_eq!(po.entries[0].msgid, "Line\none \"quoted\"\tend\\");
    }

    #[test]
    fn test_context_and_plural_keys() {
        let src = "\
msgctxt \"menu\"
msgid \"File\"
msgstr \"Tệp\"

msgid \"{count} page\"
msgid_plural \"{count} pages\"
msgstr[0] \"{count} trang\"
msgstr[1] \"{count} trang\"
";
        let messages = PoFile::parse(src).unwrap().messages();
        assert_eq!(
            messages.get("menu\u{4}File").map(String::as_str),
            Some("Tệp")
        );
        assert_eq!(
            messages.get("{count} page\0{count} pages").map(String::as_str),
            Some("{count} trang\0{count} trang")
        );
    }

    #[test]
    fn test_duplicate_keeps_last() {
        let src = "msgid \"A\"\nmsgstr \"1\"\nmsgid \"A\"\nmsgstr \"2\"\n";
        let messages = PoFile::parse(src).unwrap().messages();
        assert_eq!(messages.get("A").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_syntax_errors_carry_line_numbers() {
        let err = PoFile::parse("msgid \"A\"\nmsgstr \"B\nmsgid \"C\"\n").unwrap_err();
        assert!(matches!(err, CatalogError::Syntax { line: 2, .. }));

        let err = PoFile::parse("msgstr \"orphan\"\n").unwrap_err();
        assert!(matches!(err, CatalogError::Syntax { line: 1, .. }));

        let err = PoFile::parse("\"dangling\"\n").unwrap_err();
        assert!(matches!(err, CatalogError::Syntax { line: 1, .. }));

        let err = PoFile::parse("msgid \"A\"\nmsgfoo \"B\"\n").unwrap_err();
        assert!(matches!(err, CatalogError::Syntax { line: 2, .. }));
    }

    #[test]
    fn test_escape_inverts_unescape() {
        let original = "tab\there \"q\" back\\slash\nnext";
        assert_eq!(unescape(&escape(original)), original);
    }
}
