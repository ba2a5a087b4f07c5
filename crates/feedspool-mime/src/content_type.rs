//! Content type values for generated parts.

use std::fmt;

/// A MIME content type with ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Main type (e.g. "text", "multipart").
    pub main_type: &'static str,
    /// Subtype (e.g. "plain", "alternative").
    pub sub_type: &'static str,
    /// Parameters in serialization order (e.g. charset, boundary).
    pub parameters: Vec<(&'static str, String)>,
}

impl ContentType {
    /// `text/plain; charset=utf-8`
    #[must_use]
    pub fn text_plain() -> Self {
        Self {
            main_type: "text",
            sub_type: "plain",
            parameters: vec![("charset", "utf-8".to_string())],
        }
    }

    /// `text/html; charset=utf-8`
    #[must_use]
    pub fn text_html() -> Self {
        Self {
            main_type: "text",
            sub_type: "html",
            parameters: vec![("charset", "utf-8".to_string())],
        }
    }

    /// `multipart/alternative` with the given boundary.
    #[must_use]
    pub fn multipart_alternative(boundary: impl Into<String>) -> Self {
        Self {
            main_type: "multipart",
            sub_type: "alternative",
            parameters: vec![("boundary", boundary.into())],
        }
    }

    /// Returns the boundary parameter if present.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| *k == "boundary")
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)?;
        for (key, value) in &self.parameters {
            if value.contains(|c: char| c.is_whitespace() || "()<>@,;:\\\"/[]?=".contains(c)) {
                write!(f, "; {key}=\"{value}\"")?;
            } else {
                write!(f, "; {key}={value}")?;
            }
        }
        Ok(())
    }
}
