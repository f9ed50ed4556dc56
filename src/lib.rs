//! # vismatch
//!
//! Visual product search: find catalog items whose images look like a query
//! image, judged by cut and silhouette rather than by color.
//!
//! Every image is reduced to a deterministic 50-value fingerprint (color,
//! edge, texture, direction and shape statistics). Fingerprints are compared
//! with a weighted cosine that makes structure dominate, so a red shirt finds
//! blue shirts before it finds red dresses.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! vismatch build --image-dir ./images --catalog catalog.json
//! vismatch search query.jpg --catalog catalog.json --max-results 5
//! ```
//!
//! ### As a library
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use vismatch::prelude::*;
//!
//! let manager = Arc::new(CatalogManager::open("catalog.json").unwrap());
//! let service = SearchService::new(
//!     FeatureExtractor::default(),
//!     SimilarityScorer::weighted(),
//!     manager,
//! );
//!
//! let response = service
//!     .search_path(Path::new("query.jpg"), &SearchParams::default(), None)
//!     .unwrap();
//! for product in response.results {
//!     println!("{} {:.3}", product.product_name, product.similarity_score);
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - [`vismatch-core`](https://docs.rs/vismatch-core) - Feature vectors, layout, catalog entries and catalog
//! - [`vismatch-vision`](https://docs.rs/vismatch-vision) - Image preprocessing and feature extraction
//! - [`vismatch-similarity`](https://docs.rs/vismatch-similarity) - Weighted scoring, ranking and explanations
//! - [`vismatch-storage`](https://docs.rs/vismatch-storage) - Catalog files, catalog building and reloads

pub mod service;

// Re-export core types
pub use vismatch_core::{
    Catalog, CatalogEntry, CategoryCondition, CategoryFilter, EntryFilter, EntryId, Error,
    FeatureGroup, FeatureVector, Result, FEATURE_DIM, FEATURE_LAYOUT_VERSION,
};

// Re-export pipeline stages
pub use vismatch_vision::{CanonicalImage, ExtractorConfig, FeatureExtractor, Preprocessor, VisionError};
pub use vismatch_similarity::{
    Explanation, Ranker, ScoredMatch, ScoringMode, SearchParams, SimilarityScorer, WeightTable,
};

// Re-export storage
pub use vismatch_storage::{BuildReport, CatalogBuilder, CatalogFile, CatalogManager};

pub use service::{CatalogStatus, ProductMatch, SearchResponse, SearchService};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Catalog, CatalogEntry, CatalogManager, FeatureExtractor, FeatureVector, SearchParams,
        SearchResponse, SearchService, SimilarityScorer,
    };
}
