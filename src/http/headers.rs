//! Case-insensitive header table.
//!
//! Names are stored lowercased. Setting a name that is already present folds
//! the new value onto the old one with `", "`, which is how HTTP treats
//! repeated fields such as `Set-Cookie` or `Accept`.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use thiserror::Error;

const CRLF: &[u8] = b"\r\n";

/// Punctuation allowed in a header name besides ASCII letters and digits.
const TOKEN_PUNCTUATION: &[u8] = b"!#$%&'*+-.^_`|~";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("malformed header line, missing ':': {0}")]
    MissingSeparator(String),

    #[error("invalid header name, whitespace before ':': {0:?}")]
    WhitespaceBeforeColon(String),

    #[error("invalid header token found: {0}")]
    InvalidToken(String),

    #[error("empty header name")]
    EmptyName,
}

/// Header fields keyed by lowercase name.
///
/// Lookups go through a hash map; `order` remembers first insertion so
/// serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    values: HashMap<String, String>,
    order: Vec<String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, folding onto an existing value with `", "`.
    ///
    /// No validation happens here; use [`Headers::try_set`] for untrusted names.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.values.entry(name.to_ascii_lowercase()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.push_str(", ");
                existing.push_str(value);
            }
            Entry::Vacant(entry) => {
                self.order.push(entry.key().clone());
                entry.insert(value.to_string());
            }
        }
    }

    /// Like [`Headers::set`], but rejects names outside the token charset.
    pub fn try_set(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        validate_name(name.as_bytes())?;
        self.set(name, value);
        Ok(())
    }

    /// Replaces any existing value instead of folding.
    pub fn replace(&mut self, name: &str, value: &str) {
        match self.values.entry(name.to_ascii_lowercase()) {
            Entry::Occupied(mut entry) => {
                entry.insert(value.to_string());
            }
            Entry::Vacant(entry) => {
                self.order.push(entry.key().clone());
                entry.insert(value.to_string());
            }
        }
    }

    /// Removes a field, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        let value = self.values.remove(&name)?;
        self.order.retain(|n| *n != name);
        Some(value)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order.iter().filter_map(|name| {
            self.values
                .get(name)
                .map(|value| (name.as_str(), value.as_str()))
        })
    }

    /// Parses a single header line without its trailing CRLF.
    ///
    /// Only the name is checked. The value may carry any bytes: valid UTF-8 is
    /// kept as is, anything else is decoded byte-per-char as Latin-1.
    pub fn parse_line(&mut self, line: &[u8]) -> Result<(), HeaderError> {
        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or_else(|| HeaderError::MissingSeparator(lossy(line)))?;
        let (name, value) = (&line[..colon], &line[colon + 1..]);

        if matches!(name.last(), Some(b' ' | b'\t')) {
            return Err(HeaderError::WhitespaceBeforeColon(lossy(name)));
        }

        let name = name.trim_ascii_start();
        validate_name(name)?;

        // Token bytes are ASCII, so this is exact.
        let name: String = name.iter().map(|&b| char::from(b)).collect();
        self.set(&name, &decode_value(value.trim_ascii()));
        Ok(())
    }

    /// Consumes at most one CRLF-terminated line from `data`.
    ///
    /// Returns the number of bytes consumed and whether the blank line ending
    /// the header section was reached. `(0, false)` means no full line is
    /// buffered yet.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), HeaderError> {
        let Some(idx) = find_crlf(data) else {
            return Ok((0, false));
        };

        if idx == 0 {
            return Ok((CRLF.len(), true));
        }

        self.parse_line(&data[..idx])?;
        Ok((idx + CRLF.len(), false))
    }

    /// Serializes every field as `name: value\r\n`, then the blank line.
    pub(crate) fn to_wire(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for (name, value) in self.iter() {
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(value.as_bytes());
            buf.extend_from_slice(CRLF);
        }
        buf.extend_from_slice(CRLF);
        buf
    }
}

pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(2).position(|w| w == CRLF)
}

fn is_token_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || TOKEN_PUNCTUATION.contains(&c)
}

fn validate_name(name: &[u8]) -> Result<(), HeaderError> {
    if name.is_empty() {
        return Err(HeaderError::EmptyName);
    }
    if !name.iter().copied().all(is_token_char) {
        return Err(HeaderError::InvalidToken(lossy(name)));
    }
    Ok(())
}

fn decode_value(value: &[u8]) -> String {
    match std::str::from_utf8(value) {
        Ok(text) => text.to_string(),
        Err(_) => value.iter().map(|&b| char::from(b)).collect(),
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
