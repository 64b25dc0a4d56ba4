//! Collection name validation.

use crate::error::{CoreError, CoreResult};
use std::fmt;

/// A validated collection name.
///
/// Names are trimmed of surrounding whitespace and must not be empty.
/// Any other string is accepted, so names arriving from a URL path can be
/// used directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionName(String);

impl CollectionName {
    /// Validates a raw collection name.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the name is empty after trimming.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::validation("Collection name is required"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims() {
        let name = CollectionName::parse("  students ").unwrap();
        assert_eq!(name.as_str(), "students");
        assert_eq!(name.to_string(), "students");
    }

    #[test]
    fn parse_rejects_blank() {
        assert!(matches!(
            CollectionName::parse(""),
            Err(CoreError::Validation { .. })
        ));
        assert!(CollectionName::parse(" \t ").is_err());
    }

    #[test]
    fn parse_keeps_inner_characters() {
        let name = CollectionName::parse("class 10A/grades").unwrap();
        assert_eq!(name.as_str(), "class 10A/grades");
    }
}
