//! Ordered message headers.

use crate::error::{Error, Result};
use std::fmt;

/// An ordered collection of message headers.
///
/// Insertion order is preserved in the serialized output, so a message
/// built from the same inputs always serializes to the same bytes.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header.
    ///
    /// # Errors
    ///
    /// Returns an error if the value contains a raw line break; values
    /// must be single-line (RFC 2047 encoded upstream where needed).
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        if value.contains('\n') || value.contains('\r') {
            return Err(Error::HeaderLineBreak(value));
        }
        self.entries.push((name.into(), value));
        Ok(())
    }

    /// Returns the first value for `name`, case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if no headers have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            writeln!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}
