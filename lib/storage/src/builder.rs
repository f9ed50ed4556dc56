//! Catalog building
//!
//! Produces catalog documents from a directory of product images, and
//! re-extracts the embeddings of an existing document after the feature
//! layout changes. Extraction runs on the rayon pool; output order never
//! depends on scheduling.

use crate::catalog_file::{CatalogFile, ProductRecord, EMBEDDING_MODEL};
use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use vismatch_core::{FeatureVector, FEATURE_LAYOUT_VERSION, UNCATEGORIZED};
use vismatch_vision::FeatureExtractor;

/// File extensions treated as product images (compared case-insensitively)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp"];

/// Outcome counts of a build or regeneration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Products that received a fresh embedding
    pub extracted: usize,
    /// Products whose image file does not exist
    pub missing: usize,
    /// Products whose image exists but could not be decoded
    pub failed: usize,
}

impl BuildReport {
    pub fn total(&self) -> usize {
        self.extracted + self.missing + self.failed
    }
}

enum Outcome {
    Extracted(FeatureVector),
    Missing,
    Failed,
}

pub struct CatalogBuilder {
    extractor: FeatureExtractor,
}

impl CatalogBuilder {
    pub fn new(extractor: FeatureExtractor) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Build a catalog document from every image below `root`
    ///
    /// The product id and name are the file stem; the category is the first
    /// directory below `root`, or [`UNCATEGORIZED`] for files directly in it.
    /// Image paths are stored relative to `root` with `/` separators.
    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<(CatalogFile, BuildReport)> {
        let root = root.as_ref();
        if !root.is_dir() {
            bail!("Image directory {} does not exist", root.display());
        }

        let mut files = Vec::new();
        collect_images(root, &mut files)?;
        files.sort();
        info!(root = %root.display(), images = files.len(), "scanning image directory");

        let mut seen = HashSet::new();
        let mut products = Vec::with_capacity(files.len());
        for file in &files {
            let relative = file.strip_prefix(root).unwrap_or(file);
            let record = record_for(relative);
            if !seen.insert(record.product_id.clone()) {
                bail!(
                    "Duplicate product id {:?} (image {})",
                    record.product_id,
                    file.display()
                );
            }
            products.push(record);
        }

        let outcomes: Vec<Outcome> = files.par_iter().map(|path| self.extract(path)).collect();
        let report = apply(&mut products, outcomes);

        let mut catalog = CatalogFile::new(products);
        catalog.metadata.note = Some(format!(
            "Built from {} images in {}",
            files.len(),
            root.display()
        ));
        Ok((catalog, report))
    }

    /// Re-extract every product's embedding from `image_root/image_path`
    ///
    /// Products whose image is missing or undecodable end up without an
    /// embedding, so vectors from an older layout never survive.
    pub fn regenerate<P: AsRef<Path>>(&self, file: &CatalogFile, image_root: P) -> (CatalogFile, BuildReport) {
        let image_root = image_root.as_ref();
        let outcomes: Vec<Outcome> = file
            .products
            .par_iter()
            .map(|product| self.extract(&image_root.join(&product.image_path)))
            .collect();

        let mut products = file.products.clone();
        let report = apply(&mut products, outcomes);

        let mut regenerated = CatalogFile {
            metadata: file.metadata.clone(),
            products,
        };
        regenerated.metadata.embedding_model = EMBEDDING_MODEL.to_string();
        regenerated.metadata.feature_layout = Some(FEATURE_LAYOUT_VERSION.to_string());
        regenerated.metadata.note =
            Some("Visual embeddings extracted from the product images".to_string());
        regenerated.seal();

        info!(
            extracted = report.extracted,
            missing = report.missing,
            failed = report.failed,
            "regenerated catalog embeddings"
        );
        (regenerated, report)
    }

    fn extract(&self, path: &Path) -> Outcome {
        if !path.is_file() {
            warn!(path = %path.display(), "image not found");
            return Outcome::Missing;
        }
        match self.extractor.extract_path(path) {
            Ok(vector) => Outcome::Extracted(vector),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to extract features");
                Outcome::Failed
            }
        }
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new(FeatureExtractor::default())
    }
}

fn apply(products: &mut [ProductRecord], outcomes: Vec<Outcome>) -> BuildReport {
    let mut report = BuildReport::default();
    for (product, outcome) in products.iter_mut().zip(outcomes) {
        product.embedding = match outcome {
            Outcome::Extracted(vector) => {
                report.extracted += 1;
                Some(vector.into_inner())
            }
            Outcome::Missing => {
                report.missing += 1;
                None
            }
            Outcome::Failed => {
                report.failed += 1;
                None
            }
        };
    }
    report
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

fn collect_images(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_images(&path, out)?;
        } else if is_image(&path) {
            debug!(path = %path.display(), "found image");
            out.push(path);
        }
    }
    Ok(())
}

fn record_for(relative: &Path) -> ProductRecord {
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let components: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let category = if components.len() > 1 {
        components[0].clone()
    } else {
        UNCATEGORIZED.to_string()
    };

    ProductRecord {
        product_id: stem.clone(),
        product_name: stem,
        category,
        image_path: components.join("/"),
        embedding: None,
    }
}
