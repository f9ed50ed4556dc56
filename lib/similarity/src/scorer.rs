//! Similarity scoring
//!
//! All functions return a score in [-1.0, 1.0] (in practice [0.0, 1.0], since
//! features are non-negative) and 0.0 for any degenerate comparison. Sums are
//! accumulated in f64 in a fixed order with commutative products, so
//! `score(a, b)` and `score(b, a)` are bit-identical.

use crate::weights::WeightTable;
use serde::{Deserialize, Serialize};
use vismatch_core::{FeatureVector, FEATURE_DIM};

/// Weighted cosine similarity
///
/// `Σ w·a·b / (√Σ w·a² · √Σ w·b²)`. Returns 0.0 when either input is not
/// exactly [`FEATURE_DIM`] long, when either weighted magnitude is zero, or
/// when the result is not finite.
pub fn weighted_cosine(a: &[f32], b: &[f32], weights: &WeightTable) -> f32 {
    if a.len() != FEATURE_DIM || b.len() != FEATURE_DIM {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for ((&x, &y), &w) in a.iter().zip(b.iter()).zip(weights.as_slice()) {
        let (x, y, w) = (x as f64, y as f64, w as f64);
        dot += w * (x * y);
        norm_a += w * (x * x);
        norm_b += w * (y * y);
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    let score = dot / denom;
    if score.is_finite() {
        score as f32
    } else {
        0.0
    }
}

/// Unweighted cosine similarity with the same degenerate-input rules
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    weighted_cosine(a, b, &WeightTable::uniform())
}

/// How a [`SimilarityScorer`] compares vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Weighted cosine with the scorer's weight table
    #[default]
    Weighted,
    /// Plain cosine, ignoring weights
    Cosine,
}

/// Scores pairs of feature vectors
#[derive(Debug, Clone, Default)]
pub struct SimilarityScorer {
    weights: WeightTable,
    mode: ScoringMode,
}

impl SimilarityScorer {
    pub fn new(weights: WeightTable, mode: ScoringMode) -> Self {
        Self { weights, mode }
    }

    /// Weighted scorer with the canonical table
    pub fn weighted() -> Self {
        Self::new(WeightTable::canonical(), ScoringMode::Weighted)
    }

    /// Plain cosine scorer
    pub fn cosine() -> Self {
        Self::new(WeightTable::uniform(), ScoringMode::Cosine)
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    /// Weights actually applied when scoring
    pub fn effective_weights(&self) -> WeightTable {
        match self.mode {
            ScoringMode::Weighted => self.weights,
            ScoringMode::Cosine => WeightTable::uniform(),
        }
    }

    #[inline]
    pub fn score(&self, a: &FeatureVector, b: &FeatureVector) -> f32 {
        self.score_slices(a.as_slice(), b.as_slice())
    }

    pub fn score_slices(&self, a: &[f32], b: &[f32]) -> f32 {
        match self.mode {
            ScoringMode::Weighted => weighted_cosine(a, b, &self.weights),
            ScoringMode::Cosine => cosine(a, b),
        }
    }
}
