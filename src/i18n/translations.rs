//! Compiled catalog lookups

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::catalog::mo;
use crate::catalog::po::{CONTEXT_SEPARATOR, PLURAL_SEPARATOR};
use crate::catalog::{CatalogError, Result};

/// A loaded translation catalog
///
/// Lookups fall back to the msgid, so an empty catalog behaves as the
/// identity translation used for English.
#[derive(Debug, Clone, Default)]
pub struct Translations {
    messages: HashMap<String, String>,
    header: String,
}

impl Translations {
    /// Catalog that returns every msgid unchanged
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn from_messages(mut messages: BTreeMap<String, String>) -> Self {
        let header = messages.remove("").unwrap_or_default();
        Self {
            messages: messages.into_iter().collect(),
            header,
        }
    }

    pub fn from_mo_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_messages(mo::decode(bytes)?))
    }

    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| CatalogError::from(e).in_file(path))?;
        Self::from_mo_bytes(&bytes).map_err(|e| e.in_file(path))
    }

    /// Number of translated entries, header excluded
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Value of a header field such as `Language` or `Content-Type`
    pub fn header_field(&self, name: &str) -> Option<&str> {
        self.header.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    pub fn language(&self) -> Option<&str> {
        self.header_field("Language").filter(|l| !l.is_empty())
    }

    pub fn charset(&self) -> Option<&str> {
        self.header_field("Content-Type")?
            .split(';')
            .find_map(|part| part.trim().strip_prefix("charset="))
    }

    pub fn gettext<'a>(&'a self, msgid: &'a str) -> &'a str {
        if msgid.is_empty() {
            return msgid;
        }
        self.messages.get(msgid).map(String::as_str).unwrap_or(msgid)
    }

    /// Lookup with a disambiguating context
    pub fn pgettext<'a>(&'a self, context: &str, msgid: &'a str) -> &'a str {
        let key = format!("{}{}{}", context, CONTEXT_SEPARATOR, msgid);
        self.messages.get(&key).map(String::as_str).unwrap_or(msgid)
    }

    /// Plural lookup: form 0 when `n == 1`, form 1 otherwise
    pub fn ngettext<'a>(&'a self, singular: &'a str, plural: &'a str, n: u64) -> &'a str {
        let index = usize::from(n != 1);
        let key = format!("{}{}{}", singular, PLURAL_SEPARATOR, plural);

        if let Some(value) = self.messages.get(&key) {
            let forms: Vec<&str> = value.split(PLURAL_SEPARATOR).collect();
            if let Some(form) = forms.get(index).or(forms.last()) {
                if !form.is_empty() {
                    return *form;
                }
            }
        }

        if index == 0 {
            singular
        } else {
            plural
        }
    }
}
