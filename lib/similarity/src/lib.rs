//! # vismatch Similarity
//!
//! Scoring and ranking of feature vectors.
//!
//! - **Weight table**: one weight per dimension, shape-heavy by default
//! - **Scorer**: weighted cosine (or plain cosine as a baseline)
//! - **Ranker**: threshold, sort and truncate a catalog scan
//! - **Explain**: per-group contribution breakdown of a score
//!
//! ## Example
//!
//! ```rust
//! use vismatch_core::{Catalog, CatalogEntry, FeatureVector};
//! use vismatch_similarity::{Ranker, SearchParams};
//!
//! let query = FeatureVector::fitted(vec![0.4, 0.2, 0.9]);
//! let catalog = Catalog::from_entries(vec![
//!     CatalogEntry::new("1", "Linen shirt", "Shirts", "images/1.jpg", Some(query.clone())),
//! ]).unwrap();
//!
//! let matches = Ranker::default().rank(&query, &catalog, &SearchParams::default());
//! assert_eq!(matches[0].id.as_str(), "1");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ WeightTable │────>│   Scorer    │────>│   Ranker    │
//! │ (per dim)   │     │ (a, b → s)  │     │ (catalog)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                     ┌─────────────┐
//!                     │  Explain    │
//!                     │ (per group) │
//!                     └─────────────┘
//! ```

pub mod explain;
pub mod rank;
pub mod scorer;
pub mod weights;

pub use explain::{explain, Explanation};
pub use rank::{Ranker, ScoredMatch, SearchParams, PARALLEL_SCAN_THRESHOLD};
pub use scorer::{cosine, weighted_cosine, ScoringMode, SimilarityScorer};
pub use weights::WeightTable;
