//! An order- and casing-preserving HTTP header collection.
//!
//! Unlike map-based header types, [`Headers`] keeps every field exactly as
//! it appeared on the wire: insertion order is preserved for serialization
//! fidelity, original name casing is retained on output, and duplicate
//! names stay separate entries instead of being merged. Lookups compare
//! names case-insensitively.

use bytes::Bytes;
use std::fmt;
use std::str::{FromStr, Utf8Error};

use crate::protocol::ParseError;

/// A validated header field name: non-empty, token characters only.
///
/// The original casing is kept; equality and lookups are ASCII
/// case-insensitive.
#[derive(Debug, Clone)]
pub struct FieldName(Box<str>);

/// A validated header field value: visible characters, SP and HTAB.
///
/// Values may contain bytes above 0x7f (obs-text), so the raw form is
/// [`Bytes`] rather than a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue(Bytes);

pub(crate) fn is_token_byte(b: u8) -> bool {
    matches!(b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.'
        | b'^' | b'_' | b'`' | b'|' | b'~'
        | b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z')
}

pub(crate) fn is_value_byte(b: u8) -> bool {
    // VCHAR, SP, HTAB and obs-text; CR, LF and other controls are rejected
    b == b'\t' || (b >= b' ' && b != 0x7f)
}

impl FieldName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against another name.
    pub fn matches(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }

    /// Builds a name from a static string known to be a valid token.
    ///
    /// # Panics
    ///
    /// Panics if the string is not a valid token; intended for literals.
    pub fn from_static(name: &'static str) -> Self {
        name.parse().expect("static header name must be a valid token")
    }

    pub(crate) fn from_wire(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.is_empty() {
            return Err(ParseError::malformed_header("empty header name"));
        }
        if let Some(b) = bytes.iter().find(|b| !is_token_byte(**b)) {
            return Err(ParseError::malformed_header(format!(
                "invalid character {:?} in header name",
                char::from(*b)
            )));
        }
        // token bytes are ASCII, so utf8 conversion cannot fail
        Ok(Self(String::from_utf8_lossy(bytes).into_owned().into_boxed_str()))
    }
}

impl FromStr for FieldName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s.as_bytes())
    }
}

impl TryFrom<&str> for FieldName {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl PartialEq for FieldName {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl Eq for FieldName {}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FieldValue {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The value as UTF-8 text; fails only for obs-text values.
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.0)
    }

    /// Builds a value from a static string known to be valid.
    ///
    /// # Panics
    ///
    /// Panics if the string contains control characters; intended for
    /// literals.
    pub fn from_static(value: &'static str) -> Self {
        value.parse().expect("static header value must not contain control characters")
    }

    pub(crate) fn from_wire(bytes: &[u8]) -> Result<Self, ParseError> {
        if let Some(b) = bytes.iter().find(|b| !is_value_byte(**b)) {
            return Err(ParseError::malformed_header(format!(
                "invalid character 0x{b:02x} in header value"
            )));
        }
        Ok(Self(Bytes::copy_from_slice(bytes)))
    }
}

impl FromStr for FieldValue {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s.as_bytes())
    }
}

impl TryFrom<&str> for FieldValue {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        Self(Bytes::from(n.to_string()))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// An ordered collection of header fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: Vec<(FieldName, FieldValue)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Appends a field at the end, keeping any existing entries with the
    /// same name.
    pub fn append(&mut self, name: FieldName, value: FieldValue) {
        self.fields.push((name, value));
    }

    pub(crate) fn prepend(&mut self, name: FieldName, value: FieldValue) {
        self.fields.insert(0, (name, value));
    }

    /// The first value for `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n.matches(name)).map(|(_, v)| v)
    }

    /// All values for `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FieldValue> {
        self.fields.iter().filter(move |(n, _)| n.matches(name)).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replaces the first entry named `name` in place (position preserved)
    /// and drops any further duplicates; appends if the name is absent.
    pub fn upsert(&mut self, name: FieldName, value: FieldValue) {
        match self.fields.iter().position(|(n, _)| n.matches(name.as_str())) {
            Some(index) => {
                self.fields[index].1 = value;
                let mut i = self.fields.len();
                while i > index + 1 {
                    i -= 1;
                    if self.fields[i].0.matches(name.as_str()) {
                        self.fields.remove(i);
                    }
                }
            }
            None => self.fields.push((name, value)),
        }
    }

    /// Removes every entry named `name`.
    pub fn remove(&mut self, name: &str) {
        self.fields.retain(|(n, _)| !n.matches(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n, v))
    }
}
