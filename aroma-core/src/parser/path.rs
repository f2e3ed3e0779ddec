//! Field paths for schema diagnostics
//!
//! A path names the offending field the way a person would look it up in
//! the document: `configBody.heaterProfiles[0].timeBase`.

use core::fmt::{self, Write};

use heapless::String;

/// Maximum rendered path length
///
/// Longer paths are truncated; the prefix is still enough to locate the
/// field.
pub const MAX_FIELD_PATH_LEN: usize = 96;

/// Location of a field inside the configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldPath {
    text: String<MAX_FIELD_PATH_LEN>,
}

impl FieldPath {
    /// The document root (empty path)
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of an object member
    pub fn key(&self, key: &str) -> Self {
        let mut path = self.clone();
        if !path.text.is_empty() {
            path.push('.');
        }
        path.push_str(key);
        path
    }

    /// Path of an array element
    pub fn index(&self, index: usize) -> Self {
        let mut path = self.clone();
        // Overflow only truncates
        let _ = write!(path.text, "[{}]", index);
        path
    }

    /// Rendered path
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    fn push(&mut self, c: char) {
        let _ = self.text.push(c);
    }

    fn push_str(&mut self, s: &str) {
        for c in s.chars() {
            if self.text.push(c).is_err() {
                break;
            }
        }
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        let mut path = Self::root();
        path.push_str(s);
        path
    }
}

impl PartialEq<&str> for FieldPath {
    fn eq(&self, other: &&str) -> bool {
        self.text.as_str() == *other
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() {
            f.write_str("(document root)")
        } else {
            f.write_str(&self.text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_path() {
        let path = FieldPath::root()
            .key("configBody")
            .key("heaterProfiles")
            .index(0)
            .key("timeBase");
        assert_eq!(path, "configBody.heaterProfiles[0].timeBase");
    }

    #[test]
    fn test_index_of_index() {
        let path = FieldPath::from("configBody.heaterProfiles[1].temperatureTimeVectors")
            .index(3)
            .index(1);
        assert_eq!(
            path.as_str(),
            "configBody.heaterProfiles[1].temperatureTimeVectors[3][1]"
        );
    }

    #[test]
    fn test_truncates_instead_of_failing() {
        let mut path = FieldPath::root();
        for _ in 0..20 {
            path = path.key("segment");
        }
        assert_eq!(path.as_str().len(), MAX_FIELD_PATH_LEN);
        assert!(path.as_str().starts_with("segment.segment"));
    }
}
