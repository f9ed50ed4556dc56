//! Catalog ranking
//!
//! Scores every catalog entry against a query vector and returns the best
//! matches. Entries without a vector are skipped; ties keep catalog order.

use crate::scorer::SimilarityScorer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;
use vismatch_core::{Catalog, CatalogEntry, EntryFilter, EntryId, FeatureVector};

/// Catalogs at least this large are scanned in parallel
pub const PARALLEL_SCAN_THRESHOLD: usize = 2048;

/// Search parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Minimum score (inclusive) for a match to be returned
    #[serde(default)]
    pub min_similarity: f32,
    /// Maximum number of matches returned
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    10
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            min_similarity: 0.0,
            max_results: default_max_results(),
        }
    }
}

impl SearchParams {
    pub fn new(min_similarity: f32, max_results: usize) -> Self {
        Self {
            min_similarity,
            max_results,
        }
    }
}

/// A catalog entry's score against a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub id: EntryId,
    pub score: f32,
}

/// Ranks catalog entries by similarity to a query
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    scorer: SimilarityScorer,
}

impl Ranker {
    pub fn new(scorer: SimilarityScorer) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &SimilarityScorer {
        &self.scorer
    }

    /// Rank the whole catalog
    pub fn rank(
        &self,
        query: &FeatureVector,
        catalog: &Catalog,
        params: &SearchParams,
    ) -> Vec<ScoredMatch> {
        self.rank_filtered(query, catalog, params, None)
    }

    /// Rank only the entries accepted by `filter`
    pub fn rank_filtered(
        &self,
        query: &FeatureVector,
        catalog: &Catalog,
        params: &SearchParams,
        filter: Option<&dyn EntryFilter>,
    ) -> Vec<ScoredMatch> {
        if params.max_results == 0 || catalog.is_empty() {
            return Vec::new();
        }

        let entries = catalog.entries();
        let score_entry = |(ordinal, entry): (usize, &CatalogEntry)| {
            if !filter.map(|f| f.matches(entry)).unwrap_or(true) {
                return None;
            }
            let vector = entry.vector.as_ref()?;
            let score = self.scorer.score(query, vector);
            (score >= params.min_similarity).then_some((ordinal, score))
        };

        let mut scored: Vec<(usize, f32)> = if entries.len() >= PARALLEL_SCAN_THRESHOLD {
            entries.par_iter().enumerate().filter_map(score_entry).collect()
        } else {
            entries.iter().enumerate().filter_map(score_entry).collect()
        };

        // Stable sort, and the ordinal breaks any remaining tie
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(params.max_results);

        debug!(
            candidates = entries.len(),
            returned = scored.len(),
            min_similarity = params.min_similarity,
            "ranked catalog"
        );

        scored
            .into_iter()
            .map(|(ordinal, score)| ScoredMatch {
                id: entries[ordinal].id.clone(),
                score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::WeightTable;
    use vismatch_core::{CategoryFilter, FEATURE_DIM};

    fn vector(f: impl Fn(usize) -> f32) -> FeatureVector {
        FeatureVector::new((0..FEATURE_DIM).map(f).collect()).unwrap()
    }

    fn entry(id: &str, category: &str, v: Option<FeatureVector>) -> CatalogEntry {
        CatalogEntry::new(id, format!("Item {}", id), category, format!("images/{}.jpg", id), v)
    }

    #[test]
    fn test_identical_vector_ranks_first() {
        let query = vector(|i| (i % 7) as f32 * 0.1 + 0.05);
        let other = vector(|i| (i % 3) as f32 * 0.2 + 0.05);
        let catalog = Catalog::from_entries(vec![
            entry("other", "Tops", Some(other)),
            entry("same", "Tops", Some(query.clone())),
        ])
        .unwrap();

        let results = Ranker::default().rank(&query, &catalog, &SearchParams::new(0.0, 5));
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id.as_str(), "same");
        assert!((results[0].score - 1.0).abs() < 1e-6);
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn test_threshold_and_missing_vectors() {
        let query = vector(|_| 1.0);
        let mut near = vec![1.0; FEATURE_DIM];
        near[0] = 0.5;
        let mut far = vec![0.0; FEATURE_DIM];
        far[FEATURE_DIM - 1] = 1.0;

        let catalog = Catalog::from_entries(vec![
            entry("far", "", Some(FeatureVector::new(far).unwrap())),
            entry("none", "", None),
            entry("near", "", Some(FeatureVector::new(near).unwrap())),
        ])
        .unwrap();

        let results = Ranker::default().rank(&query, &catalog, &SearchParams::new(0.9, 10));
        let ids: Vec<&str> = results.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["near"]);
        assert!(results.iter().all(|m| m.score >= 0.9));
    }

    #[test]
    fn test_empty_catalog_and_zero_limit() {
        let query = vector(|_| 0.3);
        let ranker = Ranker::default();
        assert!(ranker.rank(&query, &Catalog::new(), &SearchParams::default()).is_empty());

        let catalog = Catalog::from_entries(vec![entry("1", "", Some(query.clone()))]).unwrap();
        assert!(ranker.rank(&query, &catalog, &SearchParams::new(0.0, 0)).is_empty());
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let v = vector(|i| i as f32 + 1.0);
        let catalog = Catalog::from_entries(vec![
            entry("b", "", Some(v.clone())),
            entry("a", "", Some(v.clone())),
            entry("c", "", Some(v.clone())),
        ])
        .unwrap();

        let results = Ranker::default().rank(&v, &catalog, &SearchParams::new(0.0, 2));
        let ids: Vec<&str> = results.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_parallel_scan_matches_sequential_order() {
        let n = PARALLEL_SCAN_THRESHOLD + 100;
        let entries: Vec<CatalogEntry> = (0..n)
            .map(|k| {
                let v = vector(|i| ((i * 13 + k * 7) % 29) as f32 / 29.0 + 0.01);
                entry(&k.to_string(), "", Some(v))
            })
            .collect();
        let catalog = Catalog::from_entries(entries).unwrap();
        let query = vector(|i| (i % 29) as f32 / 29.0 + 0.01);
        let scorer = SimilarityScorer::weighted();

        let results = Ranker::new(scorer.clone()).rank(&query, &catalog, &SearchParams::new(0.0, 50));

        let mut expected: Vec<(usize, f32)> = catalog
            .iter()
            .enumerate()
            .map(|(k, e)| (k, scorer.score(&query, e.vector.as_ref().unwrap())))
            .collect();
        expected.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));
        let expected_ids: Vec<String> = expected[..50].iter().map(|(k, _)| k.to_string()).collect();
        let ids: Vec<String> = results.iter().map(|m| m.id.to_string()).collect();
        assert_eq!(ids, expected_ids);
    }

    #[test]
    fn test_category_filter() {
        let v = vector(|_| 0.4);
        let catalog = Catalog::from_entries(vec![
            entry("1", "Shirts", Some(v.clone())),
            entry("2", "Dresses", Some(v.clone())),
            entry("3", "shirts", Some(v.clone())),
        ])
        .unwrap();

        let filter = CategoryFilter::category("Shirts");
        let results = Ranker::default().rank_filtered(
            &v,
            &catalog,
            &SearchParams::default(),
            Some(&filter),
        );
        let ids: Vec<&str> = results.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_weighted_prefers_shape_over_color() {
        // query and "recolored" share every structure dimension
        let split = vismatch_core::FeatureGroup::AspectRatio.range().start;
        let query = vector(|i| if i < split { 0.8 } else { 0.3 });
        let recolored = vector(|i| if i < split { 0.1 } else { 0.3 });
        let reshaped = vector(|i| if i < split { 0.8 } else { 0.05 + (i % 2) as f32 * 0.6 });
        let catalog = Catalog::from_entries(vec![
            entry("reshaped", "", Some(reshaped)),
            entry("recolored", "", Some(recolored)),
        ])
        .unwrap();

        let weighted = Ranker::new(SimilarityScorer::weighted())
            .rank(&query, &catalog, &SearchParams::default());
        assert_eq!(weighted[0].id.as_str(), "recolored");

        let plain = Ranker::new(SimilarityScorer::new(WeightTable::uniform(), crate::ScoringMode::Cosine))
            .rank(&query, &catalog, &SearchParams::default());
        assert_eq!(plain[0].id.as_str(), "reshaped");
    }

    #[test]
    fn test_search_params_defaults() {
        let params: SearchParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, SearchParams::default());
        assert_eq!(params.max_results, 10);
        assert_eq!(params.min_similarity, 0.0);
    }
}
