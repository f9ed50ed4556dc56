// Entry filters applied before scoring
use crate::CatalogEntry;

pub trait EntryFilter: Send + Sync {
    fn matches(&self, entry: &CatalogEntry) -> bool;
}

/// Keep entries whose category label equals one of the given labels (case-insensitive)
pub struct CategoryFilter {
    condition: CategoryCondition,
}

#[derive(Debug, Clone)]
pub enum CategoryCondition {
    Is(String),
    AnyOf(Vec<String>),
    Not(Box<CategoryCondition>),
}

impl CategoryFilter {
    pub fn new(condition: CategoryCondition) -> Self {
        Self { condition }
    }

    /// Shorthand for a single-category filter
    pub fn category(label: impl Into<String>) -> Self {
        Self::new(CategoryCondition::Is(label.into()))
    }

    fn matches_condition(condition: &CategoryCondition, entry: &CatalogEntry) -> bool {
        let label = entry.category_label();
        match condition {
            CategoryCondition::Is(wanted) => label.eq_ignore_ascii_case(wanted.trim()),
            CategoryCondition::AnyOf(wanted) => {
                wanted.iter().any(|w| label.eq_ignore_ascii_case(w.trim()))
            }
            CategoryCondition::Not(inner) => !Self::matches_condition(inner, entry),
        }
    }
}

impl EntryFilter for CategoryFilter {
    fn matches(&self, entry: &CatalogEntry) -> bool {
        Self::matches_condition(&self.condition, entry)
    }
}

impl<F> EntryFilter for F
where
    F: Fn(&CatalogEntry) -> bool + Send + Sync,
{
    fn matches(&self, entry: &CatalogEntry) -> bool {
        self(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(category: &str) -> CatalogEntry {
        CatalogEntry::new("1", "Item", category, "images/1.jpg", None)
    }

    #[test]
    fn test_category_is_case_insensitive() {
        let filter = CategoryFilter::category("dresses");
        assert!(filter.matches(&entry("Dresses")));
        assert!(!filter.matches(&entry("Skirts")));
    }

    #[test]
    fn test_any_of_and_not() {
        let any = CategoryFilter::new(CategoryCondition::AnyOf(vec![
            "Shirts".to_string(),
            "Tops".to_string(),
        ]));
        assert!(any.matches(&entry("Tops")));
        assert!(!any.matches(&entry("Kurtas")));

        let not = CategoryFilter::new(CategoryCondition::Not(Box::new(CategoryCondition::Is(
            "Tops".to_string(),
        ))));
        assert!(!not.matches(&entry("Tops")));
        assert!(not.matches(&entry("Kurtas")));
    }

    #[test]
    fn test_uncategorized_label() {
        let filter = CategoryFilter::category("Uncategorized");
        assert!(filter.matches(&entry("")));
    }

    #[test]
    fn test_closure_filter() {
        let filter = |e: &CatalogEntry| e.has_vector();
        assert!(!EntryFilter::matches(&filter, &entry("Tops")));
    }
}
