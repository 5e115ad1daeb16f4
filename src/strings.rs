//! String interning table.
//!
//! Names and enum option literals are written to the bit-packed wire as numeric
//! indices into a [`StringTable`]. The table is built fresh for every encode call:
//! the first occurrence of a string fixes its index and later occurrences reuse it.
//! On the wire the table is a single byte string with entries joined by
//! [`SEPARATOR`]; decoding splits it again, so indices line up with the order in
//! which the encoder interned them.

use crate::{Error, Result};
use indexmap::IndexSet;

/// Entry separator in the serialized table (ASCII unit separator).
pub const SEPARATOR: char = '\u{1F}';

/// Ordered, deduplicated list of strings.
///
/// # Examples
///
/// ```rust
/// use schema_token::StringTable;
///
/// let mut table = StringTable::new();
/// assert_eq!(table.intern("offset").unwrap(), 0);
/// assert_eq!(table.intern("start").unwrap(), 1);
/// assert_eq!(table.intern("offset").unwrap(), 0);
///
/// let bytes = table.to_bytes();
/// let back = StringTable::from_bytes(&bytes).unwrap();
/// assert_eq!(back, table);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StringTable {
    entries: IndexSet<String>,
}

impl StringTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `s`, appending it first if it is not yet present.
    ///
    /// Strings containing [`SEPARATOR`] cannot be stored and are rejected.
    pub fn intern(&mut self, s: &str) -> Result<usize> {
        if let Some(index) = self.entries.get_index_of(s) {
            return Ok(index);
        }
        if s.contains(SEPARATOR) {
            return Err(Error::string_table(format!(
                "`{}` contains the reserved separator U+001F",
                s.escape_debug()
            )));
        }
        let (index, _) = self.entries.insert_full(s.to_string());
        tracing::trace!(index, entry = s, "interned string");
        Ok(index)
    }

    /// Index of `s` if it has been interned.
    #[must_use]
    pub fn index_of(&self, s: &str) -> Option<usize> {
        self.entries.get_index_of(s)
    }

    /// Looks up the string stored at `index`.
    pub fn get(&self, index: usize) -> Result<&str> {
        self.entries
            .get_index(index)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::string_table(format!(
                    "index {} is outside the string table ({} entries)",
                    index,
                    self.entries.len()
                ))
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Joins all entries with [`SEPARATOR`] and returns the UTF-8 bytes.
    ///
    /// An empty table and a table holding one empty string both serialize to no
    /// bytes; [`StringTable::from_bytes`] yields the latter.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut joined = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                joined.push(SEPARATOR);
            }
            joined.push_str(entry);
        }
        joined.into_bytes()
    }

    /// Splits `bytes` on [`SEPARATOR`], assigning indices in order.
    ///
    /// Repeated entries are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let joined = std::str::from_utf8(bytes)
            .map_err(|e| Error::string_table(format!("table is not UTF-8: {}", e)))?;
        let mut entries = IndexSet::new();
        for entry in joined.split(SEPARATOR) {
            if !entries.insert(entry.to_string()) {
                return Err(Error::string_table(format!(
                    "duplicate table entry `{}`",
                    entry
                )));
            }
        }
        Ok(StringTable { entries })
    }
}
