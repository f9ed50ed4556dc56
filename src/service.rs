//! Search service
//!
//! Glues the extractor, the scorer and the shared catalog into the one
//! operation callers care about: "which products look like this image?".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use vismatch_core::{Catalog, CatalogEntry, CategoryFilter, EntryFilter, FeatureGroup, FeatureVector};
use vismatch_similarity::{Ranker, SearchParams, SimilarityScorer};
use vismatch_storage::CatalogManager;
use vismatch_vision::{FeatureExtractor, Result};

/// One matched product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMatch {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub image_path: String,
    pub similarity_score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<BTreeMap<FeatureGroup, f32>>,
}

impl ProductMatch {
    fn new(entry: &CatalogEntry, score: f32) -> Self {
        Self {
            product_id: entry.id.to_string(),
            product_name: entry.name.clone(),
            category: entry.category.clone(),
            image_path: entry.image_path.clone(),
            similarity_score: score,
            explanation: None,
        }
    }
}

/// Ranked matches for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total_results: usize,
    pub results: Vec<ProductMatch>,
    /// Wall-clock seconds spent extracting and ranking
    pub processing_time: f64,
}

/// Catalog summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStatus {
    pub catalog_loaded: bool,
    pub total_products: usize,
    pub products_with_embeddings: usize,
    pub categories: BTreeMap<String, usize>,
}

pub struct SearchService {
    extractor: FeatureExtractor,
    ranker: Ranker,
    catalog: Arc<CatalogManager>,
    explain: bool,
}

impl SearchService {
    pub fn new(extractor: FeatureExtractor, scorer: SimilarityScorer, catalog: Arc<CatalogManager>) -> Self {
        Self {
            extractor,
            ranker: Ranker::new(scorer),
            catalog,
            explain: false,
        }
    }

    /// Attach a per-group score breakdown to every match
    #[must_use]
    pub fn with_explanations(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn catalog(&self) -> &CatalogManager {
        &self.catalog
    }

    /// Search with raw image bytes; fails only if the bytes cannot be decoded
    pub fn search_bytes(
        &self,
        bytes: &[u8],
        params: &SearchParams,
        category: Option<&str>,
    ) -> Result<SearchResponse> {
        let start = Instant::now();
        let query = self.extractor.extract_bytes(bytes)?;
        Ok(self.search_from(start, &query, params, category))
    }

    /// Search with an image file
    pub fn search_path(
        &self,
        path: &Path,
        params: &SearchParams,
        category: Option<&str>,
    ) -> Result<SearchResponse> {
        let start = Instant::now();
        let query = self.extractor.extract_path(path)?;
        Ok(self.search_from(start, &query, params, category))
    }

    /// Search with an already extracted vector
    pub fn search_vector(
        &self,
        query: &FeatureVector,
        params: &SearchParams,
        category: Option<&str>,
    ) -> SearchResponse {
        self.search_from(Instant::now(), query, params, category)
    }

    fn search_from(
        &self,
        start: Instant,
        query: &FeatureVector,
        params: &SearchParams,
        category: Option<&str>,
    ) -> SearchResponse {
        let catalog = self.catalog.snapshot();
        let filter = category.map(CategoryFilter::category);
        let matches = self.ranker.rank_filtered(
            query,
            &catalog,
            params,
            filter.as_ref().map(|f| f as &dyn EntryFilter),
        );

        let results: Vec<ProductMatch> = matches
            .iter()
            .filter_map(|m| {
                let entry = catalog.get(m.id.as_str())?;
                let mut product = ProductMatch::new(entry, m.score);
                if self.explain {
                    if let Some(vector) = &entry.vector {
                        product.explanation = Some(self.ranker.scorer().explain(query, vector).contributions);
                    }
                }
                Some(product)
            })
            .collect();

        let processing_time = start.elapsed().as_secs_f64();
        info!(
            results = results.len(),
            category = category.unwrap_or("*"),
            elapsed_ms = processing_time * 1000.0,
            "search completed"
        );
        SearchResponse {
            total_results: results.len(),
            results,
            processing_time,
        }
    }

    /// Product details by id
    pub fn product(&self, id: &str) -> Option<CatalogEntry> {
        self.catalog.snapshot().get(id).cloned()
    }

    /// Product counts per category
    pub fn categories(&self) -> BTreeMap<String, usize> {
        self.catalog.snapshot().category_counts()
    }

    pub fn status(&self) -> CatalogStatus {
        status_of(&self.catalog.snapshot())
    }
}

fn status_of(catalog: &Catalog) -> CatalogStatus {
    debug!(entries = catalog.len(), "computing catalog status");
    CatalogStatus {
        catalog_loaded: !catalog.is_empty(),
        total_products: catalog.len(),
        products_with_embeddings: catalog.vector_count(),
        categories: catalog.category_counts(),
    }
}
