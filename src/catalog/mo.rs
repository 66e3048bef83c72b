//! gettext `.mo` binary catalogs
//!
//! # Layout
//!
//! ```text
//! offset  size   field
//! 0       4      magic 0x950412de
//! 4       4      revision (0)
//! 8       4      N, number of strings
//! 12      4      O, offset of the original string table
//! 16      4      T, offset of the translation table
//! 20      4      hash table size (0, no hash table is written)
//! 24      4      hash table offset (0)
//! O       8*N    (length, offset) of each msgid, sorted
//! T       8*N    (length, offset) of each msgstr
//! ...            msgid bytes, then msgstr bytes, each NUL-terminated
//! ```
//!
//! Lengths exclude the terminating NUL. The encoder writes little-endian;
//! the decoder accepts either byte order.

use std::collections::BTreeMap;

use super::error::{CatalogError, Result};

/// Little-endian magic number
pub const MAGIC: u32 = 0x950412de;
/// Size of the fixed header
pub const HEADER_SIZE: usize = 28;

/// Encode messages into `.mo` bytes
///
/// `BTreeMap` iteration order is byte order of the UTF-8 keys, which is
/// the order gettext expects for binary search.
pub fn encode(messages: &BTreeMap<String, String>) -> Vec<u8> {
    let count = messages.len();
    let originals_offset = HEADER_SIZE;
    let translations_offset = originals_offset + count * 8;
    let data_offset = translations_offset + count * 8;

    let ids_len: usize = messages.keys().map(|k| k.len() + 1).sum();
    let strs_len: usize = messages.values().map(|v| v.len() + 1).sum();

    let mut out = Vec::with_capacity(data_offset + ids_len + strs_len);
    for word in [
        MAGIC,
        0,
        count as u32,
        originals_offset as u32,
        translations_offset as u32,
        0,
        0,
    ] {
        out.extend_from_slice(&word.to_le_bytes());
    }

    let mut cursor = data_offset;
    for key in messages.keys() {
        push_pair(&mut out, key.len(), cursor);
        cursor += key.len() + 1;
    }
    for value in messages.values() {
        push_pair(&mut out, value.len(), cursor);
        cursor += value.len() + 1;
    }

    for key in messages.keys() {
        out.extend_from_slice(key.as_bytes());
        out.push(0);
    }
    for value in messages.values() {
        out.extend_from_slice(value.as_bytes());
        out.push(0);
    }

    out
}

fn push_pair(out: &mut Vec<u8>, len: usize, offset: usize) {
    out.extend_from_slice(&(len as u32).to_le_bytes());
    out.extend_from_slice(&(offset as u32).to_le_bytes());
}

#[derive(Clone, Copy)]
enum ByteOrder {
    Little,
    Big,
}

struct Reader<'a> {
    bytes: &'a [u8],
    order: ByteOrder,
}

impl Reader<'_> {
    fn u32_at(&self, offset: usize) -> Result<u32> {
        let end = offset
            .checked_add(4)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| truncated(offset))?;
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[offset..end]);
        Ok(match self.order {
            ByteOrder::Little => u32::from_le_bytes(word),
            ByteOrder::Big => u32::from_be_bytes(word),
        })
    }

    fn string_at(&self, table: usize, index: usize) -> Result<String> {
        let entry = table + index * 8;
        let len = self.u32_at(entry)? as usize;
        let offset = self.u32_at(entry + 4)? as usize;

        let end = offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                CatalogError::InvalidFormat(format!(
                    "string {} at offset {} (length {}) is out of bounds",
                    index, offset, len
                ))
            })?;

        String::from_utf8(self.bytes[offset..end].to_vec()).map_err(|e| {
            CatalogError::InvalidFormat(format!("string {} is not valid UTF-8: {}", index, e))
        })
    }
}

fn truncated(offset: usize) -> CatalogError {
    CatalogError::InvalidFormat(format!("truncated at offset {}", offset))
}

/// Decode `.mo` bytes into an ordered message map
pub fn decode(bytes: &[u8]) -> Result<BTreeMap<String, String>> {
    if bytes.len() < HEADER_SIZE {
        return Err(CatalogError::InvalidFormat(format!(
            "file is {} bytes, header needs {}",
            bytes.len(),
            HEADER_SIZE
        )));
    }

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&bytes[..4]);
    let order = if u32::from_le_bytes(magic) == MAGIC {
        ByteOrder::Little
    } else if u32::from_be_bytes(magic) == MAGIC {
        ByteOrder::Big
    } else {
        return Err(CatalogError::InvalidFormat(format!(
            "bad magic number {:02x?}",
            magic
        )));
    };

    let reader = Reader { bytes, order };

    let revision = reader.u32_at(4)?;
    if revision >> 16 > 1 {
        return Err(CatalogError::InvalidFormat(format!(
            "unsupported revision {:#x}",
            revision
        )));
    }

    let count = reader.u32_at(8)? as usize;
    let originals = reader.u32_at(12)? as usize;
    let translations = reader.u32_at(16)? as usize;

    let mut messages = BTreeMap::new();
    for i in 0..count {
        let key = reader.string_at(originals, i)?;
        let value = reader.string_at(translations, i)?;
        messages.insert(key, value);
    }

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn sample() -> BTreeMap<String, String> {
        let mut messages = BTreeMap::new();
        messages.insert(String::new(), "Language: vi\n".to_string());
        messages.insert("Ready".to_string(), "Sẵn sàng".to_string());
        messages.insert("Convert".to_string(), "Chuyển đổi".to_string());
        messages
    }

    #[test]
    fn test_encode_header() {
        let bytes = encode(&sample());
        assert_eq!(word(&bytes, 0), MAGIC);
        assert_eq!(word(&bytes, 4), 0);
        assert_eq!(word(&bytes, 8), 3);
        assert_eq!(word(&bytes, 12), 28);
        assert_eq!(word(&bytes, 16), 28 + 3 * 8);
        assert_eq!(word(&bytes, 20), 0);
        assert_eq!(word(&bytes, 24), 0);
    }

    #[test]
    fn test_encode_tables_point_at_sorted_nul_terminated_strings() {
        let bytes = encode(&sample());
        let data_start = 28 + 3 * 16;

        // "" sorts first, then "Convert", then "Ready"
        assert_eq!(word(&bytes, 28), 0);
        assert_eq!(word(&bytes, 32) as usize, data_start);
        assert_eq!(word(&bytes, 36), 7);
        assert_eq!(word(&bytes, 40) as usize, data_start + 1);
        assert_eq!(word(&bytes, 44), 5);
        assert_eq!(word(&bytes, 48) as usize, data_start + 1 + 8);

        let off = word(&bytes, 40) as usize;
        assert_eq!(&bytes[off..off + 8], b"Convert\0");

        // First translation follows all ids
        let strs_start = data_start + 1 + 8 + 6;
        assert_eq!(word(&bytes, 56) as usize, strs_start);
        assert_eq!(bytes.len(), strs_start + "Language: vi\n".len() + 1
            + "Chuyển đổi".len() + 1 + "Sẵn sàng".len() + 1);
        assert_eq!(*bytes.last().unwrap(), 0);
    }

    #[test]
    fn test_decode_encoded() {
        let messages = sample();
        assert_eq!(decode(&encode(&messages)).unwrap(), messages);
    }

    #[test]
    fn test_empty_catalog() {
        let bytes = encode(&BTreeMap::new());
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert!(decode(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_decode_big_endian() {
        // One entry: "a" -> "b"
        let mut bytes = Vec::new();
        for w in [MAGIC, 0, 1, 28, 36, 0, 0, 1, 44, 1, 46] {
            bytes.extend_from_slice(&w.to_be_bytes());
        }
        bytes.extend_from_slice(b"a\0b\0");

        let messages = decode(&bytes).unwrap();
        assert_eq!(messages.get("a").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(decode(b"short"), Err(CatalogError::InvalidFormat(_))));

        let mut bad_magic = encode(&sample());
        bad_magic[0] = 0;
        assert!(matches!(decode(&bad_magic), Err(CatalogError::InvalidFormat(_))));

        let bytes = encode(&sample());
        let truncated = &bytes[..bytes.len() - 4];
        assert!(matches!(decode(truncated), Err(CatalogError::InvalidFormat(_))));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let mut messages = BTreeMap::new();
        messages.insert("k".to_string(), "v".to_string());
        let mut bytes = encode(&messages);
        let value_offset = word(&bytes, 28 + 8 + 4) as usize;
        bytes[value_offset] = 0xff;
        assert!(matches!(decode(&bytes), Err(CatalogError::InvalidFormat(_))));
    }
}
