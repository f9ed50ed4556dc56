//! Per-group score breakdown
//!
//! Splits a weighted cosine score into the share contributed by each feature
//! group. The shares add up to the score, so a caller can see whether a match
//! came from silhouette or merely from color.

use crate::scorer::SimilarityScorer;
use crate::weights::WeightTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vismatch_core::{FeatureGroup, FeatureVector, FEATURE_DIM};

/// A score together with its per-group contributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub score: f32,
    pub contributions: BTreeMap<FeatureGroup, f32>,
}

impl Explanation {
    /// Groups ordered by contribution, largest first
    pub fn ranked_groups(&self) -> Vec<(FeatureGroup, f32)> {
        let mut groups: Vec<(FeatureGroup, f32)> =
            self.contributions.iter().map(|(&g, &c)| (g, c)).collect();
        groups.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        groups
    }

    /// Summed contribution of the color groups
    pub fn color_share(&self) -> f32 {
        self.contributions
            .iter()
            .filter(|(g, _)| g.is_color())
            .map(|(_, &c)| c)
            .sum()
    }
}

/// Each group's share of `weighted_cosine(query, candidate, weights)`
///
/// Degenerate comparisons (wrong length, zero magnitude) yield 0.0 for every
/// group.
pub fn explain(query: &[f32], candidate: &[f32], weights: &WeightTable) -> BTreeMap<FeatureGroup, f32> {
    let zeros = || -> BTreeMap<FeatureGroup, f32> {
        FeatureGroup::ALL.iter().map(|&g| (g, 0.0)).collect()
    };
    if query.len() != FEATURE_DIM || candidate.len() != FEATURE_DIM {
        return zeros();
    }

    let w = weights.as_slice();
    let norm = |v: &[f32]| {
        v.iter()
            .zip(w)
            .map(|(&x, &wi)| wi as f64 * (x as f64 * x as f64))
            .sum::<f64>()
            .sqrt()
    };
    let denom = norm(query) * norm(candidate);
    if denom == 0.0 || !denom.is_finite() {
        return zeros();
    }

    FeatureGroup::ALL
        .iter()
        .map(|&group| {
            let dot: f64 = group
                .range()
                .map(|i| w[i] as f64 * (query[i] as f64 * candidate[i] as f64))
                .sum();
            (group, (dot / denom) as f32)
        })
        .collect()
}

impl SimilarityScorer {
    /// Score and break the score down by feature group
    pub fn explain(&self, query: &FeatureVector, candidate: &FeatureVector) -> Explanation {
        let weights = self.effective_weights();
        Explanation {
            score: self.score(query, candidate),
            contributions: explain(query.as_slice(), candidate.as_slice(), &weights),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::weighted_cosine;

    fn vector(f: impl Fn(usize) -> f32) -> Vec<f32> {
        (0..FEATURE_DIM).map(f).collect()
    }

    #[test]
    fn test_contributions_sum_to_score() {
        let w = WeightTable::canonical();
        let a = vector(|i| ((i * 11) % 19) as f32 / 19.0 + 0.02);
        let b = vector(|i| ((i * 5) % 23) as f32 / 23.0 + 0.02);

        let parts = explain(&a, &b, &w);
        assert_eq!(parts.len(), FeatureGroup::ALL.len());
        let total: f32 = parts.values().sum();
        assert!((total - weighted_cosine(&a, &b, &w)).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_is_all_zero() {
        let w = WeightTable::canonical();
        let parts = explain(&vector(|_| 0.0), &vector(|_| 1.0), &w);
        assert!(parts.values().all(|&c| c == 0.0));
        assert!(explain(&[1.0; 3], &[1.0; 3], &w).values().all(|&c| c == 0.0));
    }

    #[test]
    fn test_structure_dominates_identical_match() {
        let v = FeatureVector::new(vector(|_| 0.5)).unwrap();
        let explanation = SimilarityScorer::weighted().explain(&v, &v);

        assert!((explanation.score - 1.0).abs() < 1e-6);
        assert!(explanation.color_share() < 0.05);
        let (top, _) = explanation.ranked_groups()[0];
        assert_eq!(top, FeatureGroup::Edge);
    }

    #[test]
    fn test_cosine_mode_uses_uniform_weights() {
        let v = FeatureVector::new(vector(|_| 0.5)).unwrap();
        let explanation = SimilarityScorer::cosine().explain(&v, &v);
        let hist = explanation.contributions[&FeatureGroup::ColorHistogram];
        assert!((hist - 15.0 / 50.0).abs() < 1e-6);
    }
}
