use crate::vector::FeatureVector;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned to entries that carry none
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Catalog identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        EntryId(s)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        EntryId(s.to_string())
    }
}

impl From<u64> for EntryId {
    fn from(i: u64) -> Self {
        EntryId(i.to_string())
    }
}

impl std::borrow::Borrow<str> for EntryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// An immutable catalog record
///
/// `vector` is `None` when no fingerprint could be produced for the image;
/// such entries stay in the catalog but never take part in ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: EntryId,
    pub name: String,
    pub category: String,
    pub image_path: String,
    pub vector: Option<FeatureVector>,
}

impl CatalogEntry {
    #[inline]
    #[must_use]
    pub fn new(
        id: impl Into<EntryId>,
        name: impl Into<String>,
        category: impl Into<String>,
        image_path: impl Into<String>,
        vector: Option<FeatureVector>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            image_path: image_path.into(),
            vector,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_vector(mut self, vector: FeatureVector) -> Self {
        self.vector = Some(vector);
        self
    }

    #[inline]
    pub fn has_vector(&self) -> bool {
        self.vector.is_some()
    }

    /// Category label, with blank labels reported as [`UNCATEGORIZED`]
    pub fn category_label(&self) -> &str {
        let trimmed = self.category.trim();
        if trimmed.is_empty() {
            UNCATEGORIZED
        } else {
            trimmed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_conversions() {
        assert_eq!(EntryId::from("42"), EntryId::from(42u64));
        assert_eq!(EntryId::from("abc".to_string()).to_string(), "abc");
    }

    #[test]
    fn test_with_vector() {
        let entry = CatalogEntry::new("1", "Shirt", "Shirts", "images/1.jpg", None);
        assert!(!entry.has_vector());
        let entry = entry.with_vector(FeatureVector::fallback());
        assert!(entry.has_vector());
    }

    #[test]
    fn test_category_label() {
        let entry = CatalogEntry::new("1", "Shirt", "  ", "images/1.jpg", None);
        assert_eq!(entry.category_label(), UNCATEGORIZED);
        let entry = CatalogEntry::new("1", "Shirt", "Shirts", "images/1.jpg", None);
        assert_eq!(entry.category_label(), "Shirts");
    }
}
