use crate::entry::{CatalogEntry, EntryId};
use crate::{Error, Result};
use ahash::AHashMap;
use std::collections::BTreeMap;

/// An insertion-ordered collection of catalog entries
///
/// Built once (offline or at load time) and then shared read-only, typically
/// behind an `Arc`. Iteration order is insertion order, which the ranker
/// relies on to break score ties deterministically.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: AHashMap<EntryId, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, rejecting duplicate identifiers
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = CatalogEntry>,
    {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.insert(entry)?;
        }
        Ok(catalog)
    }

    /// Append an entry
    pub fn insert(&mut self, entry: CatalogEntry) -> Result<()> {
        if self.index.contains_key(&entry.id) {
            return Err(Error::EntryExists(entry.id.to_string()));
        }
        self.index.insert(entry.id.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that carry a feature vector
    pub fn vector_count(&self) -> usize {
        self.entries.iter().filter(|e| e.has_vector()).count()
    }

    /// Get an entry by identifier
    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    /// Like [`Catalog::get`], but a missing entry is an error
    pub fn require(&self, id: &str) -> Result<&CatalogEntry> {
        self.get(id).ok_or_else(|| Error::EntryNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    /// Number of entries per category label
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.category_label().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct category labels, sorted
    pub fn categories(&self) -> Vec<String> {
        self.category_counts().into_keys().collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
