//! Content-Type and Content-Disposition header values.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// MIME content type with parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentType {
    /// Main type (e.g., "text", "multipart").
    pub main_type: String,
    /// Subtype (e.g., "plain", "mixed").
    pub sub_type: String,
    /// Parameters (e.g., charset=utf-8, boundary=xxx).
    pub parameters: HashMap<String, String>,
}

impl ContentType {
    /// Parses a content type string.
    ///
    /// Format: `type/subtype; param1=value1; param2=value2`. Type, subtype
    /// and parameter names are lowercased; parameter values keep their case
    /// with surrounding quotes removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMediaType`] when the `type/subtype` shape is
    /// missing or either side is empty.
    pub fn parse(value: &str) -> Result<Self> {
        let mut parts = value.split(';');

        let type_str = parts.next().unwrap_or_default().trim();
        let (main_type, sub_type) = type_str
            .split_once('/')
            .ok_or_else(|| Error::InvalidMediaType(format!("missing subtype in {value:?}")))?;

        let main_type = main_type.trim().to_lowercase();
        let sub_type = sub_type.trim().to_lowercase();
        if main_type.is_empty() || sub_type.is_empty() {
            return Err(Error::InvalidMediaType(format!(
                "empty type or subtype in {value:?}"
            )));
        }

        Ok(Self {
            main_type,
            sub_type,
            parameters: parse_parameters(parts),
        })
    }

    /// Returns the normalized `type/subtype` string without parameters.
    #[must_use]
    pub fn essence(&self) -> String {
        format!("{}/{}", self.main_type, self.sub_type)
    }

    /// Returns the charset parameter if present.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameters.get("charset").map(String::as_str)
    }

    /// Returns the boundary parameter if present.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameters.get("boundary").map(String::as_str)
    }

    /// Checks if this is a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type == "multipart"
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)
    }
}

/// Content-Disposition header value: a bare disposition token with the same
/// parameter grammar as a content type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentDisposition {
    /// Disposition token, lowercased (e.g., "attachment", "inline").
    pub disposition: String,
    /// Parameters (e.g., filename=report.pdf).
    pub parameters: HashMap<String, String>,
}

impl ContentDisposition {
    /// Parses a content disposition string.
    ///
    /// Format: `disposition; param1=value1; ...`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMediaType`] when the disposition token is
    /// empty.
    pub fn parse(value: &str) -> Result<Self> {
        let mut parts = value.split(';');

        let disposition = parts.next().unwrap_or_default().trim().to_lowercase();
        if disposition.is_empty() {
            return Err(Error::InvalidMediaType(format!(
                "empty disposition in {value:?}"
            )));
        }

        Ok(Self {
            disposition,
            parameters: parse_parameters(parts),
        })
    }

    /// Returns the filename parameter if present.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.parameters.get("filename").map(String::as_str)
    }
}

fn parse_parameters(parts: std::str::Split<'_, char>) -> HashMap<String, String> {
    let mut parameters = HashMap::new();
    for param in parts {
        if let Some((key, value)) = param.trim().split_once('=') {
            let key = key.trim().to_lowercase();
            let value = value.trim().trim_matches('"').to_string();
            parameters.insert(key, value);
        }
    }
    parameters
}
