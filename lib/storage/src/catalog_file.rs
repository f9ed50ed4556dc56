// On-disk catalog document
use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use vismatch_core::{Catalog, CatalogEntry, FeatureVector, FEATURE_DIM, FEATURE_LAYOUT_VERSION};

/// Model name recorded for catalogs built by this crate
pub const EMBEDDING_MODEL: &str = "visual_feature_based";

/// Validation failures of a catalog document
#[derive(Error, Debug, PartialEq)]
pub enum CatalogFileError {
    #[error("Catalog uses feature layout {found:?}, expected {expected:?}")]
    LayoutMismatch { expected: String, found: String },

    #[error("Catalog declares {found} feature dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Catalog checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch { stored: String, computed: String },
}

fn default_feature_dim() -> usize {
    FEATURE_DIM
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMetadata {
    #[serde(default)]
    pub embedding_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_layout: Option<String>,
    #[serde(default = "default_feature_dim")]
    pub feature_dim: usize,
    #[serde(default)]
    pub total_products: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Fields written by other tools, kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for CatalogMetadata {
    fn default() -> Self {
        Self {
            embedding_model: EMBEDDING_MODEL.to_string(),
            feature_layout: Some(FEATURE_LAYOUT_VERSION.to_string()),
            feature_dim: FEATURE_DIM,
            total_products: 0,
            generation_timestamp: None,
            checksum: None,
            note: None,
            extra: BTreeMap::new(),
        }
    }
}

/// One product as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl ProductRecord {
    /// Stored embedding as a feature vector, if it has the right length
    pub fn vector(&self) -> Option<FeatureVector> {
        let values = self.embedding.as_ref()?;
        match FeatureVector::from_slice(values) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(product_id = %self.product_id, error = %e, "ignoring stored embedding");
                None
            }
        }
    }
}

impl From<&CatalogEntry> for ProductRecord {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            product_id: entry.id.to_string(),
            product_name: entry.name.clone(),
            category: entry.category.clone(),
            image_path: entry.image_path.clone(),
            embedding: entry.vector.as_ref().map(|v| v.as_slice().to_vec()),
        }
    }
}

/// The catalog JSON document: metadata plus products in catalog order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub metadata: CatalogMetadata,
    #[serde(default)]
    pub products: Vec<ProductRecord>,
}

impl CatalogFile {
    /// Document for embeddings extracted by this crate, tagged with the current layout
    pub fn new(products: Vec<ProductRecord>) -> Self {
        let mut file = Self {
            metadata: CatalogMetadata::default(),
            products,
        };
        file.seal();
        file
    }

    /// Document for an in-memory catalog
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self::new(catalog.iter().map(ProductRecord::from).collect())
    }

    /// SHA-256 over the little-endian bytes of every stored embedding, in product order
    pub fn compute_checksum(&self) -> String {
        let mut hasher = Sha256::new();
        for values in self.products.iter().filter_map(|p| p.embedding.as_ref()) {
            for v in values {
                hasher.update(v.to_le_bytes());
            }
        }
        format!("{:x}", hasher.finalize())
    }

    /// Refresh the derived metadata: count, timestamp and checksum
    ///
    /// The layout tag is left alone. Only documents whose embeddings this
    /// crate extracted carry the current tag, see [`CatalogFile::new`].
    pub fn seal(&mut self) {
        self.metadata.total_products = self.products.len();
        self.metadata.feature_dim = FEATURE_DIM;
        self.metadata.generation_timestamp = Some(Utc::now().to_rfc3339());
        self.metadata.checksum = Some(self.compute_checksum());
    }

    /// Check layout tag, dimension and checksum
    pub fn validate(&self) -> std::result::Result<(), CatalogFileError> {
        match &self.metadata.feature_layout {
            Some(found) if found != FEATURE_LAYOUT_VERSION => {
                return Err(CatalogFileError::LayoutMismatch {
                    expected: FEATURE_LAYOUT_VERSION.to_string(),
                    found: found.clone(),
                });
            }
            Some(_) => {}
            None => warn!("catalog has no feature layout tag, assuming {}", FEATURE_LAYOUT_VERSION),
        }

        if self.metadata.feature_dim != FEATURE_DIM {
            return Err(CatalogFileError::DimensionMismatch {
                expected: FEATURE_DIM,
                found: self.metadata.feature_dim,
            });
        }

        if let Some(stored) = &self.metadata.checksum {
            let computed = self.compute_checksum();
            if !stored.eq_ignore_ascii_case(&computed) {
                return Err(CatalogFileError::ChecksumMismatch {
                    stored: stored.clone(),
                    computed,
                });
            }
        }
        Ok(())
    }

    /// Parse a catalog document without checking its layout tag or checksum
    ///
    /// For tooling that rewrites embeddings, such as regeneration after a
    /// layout change. Searching should go through [`CatalogFile::load`].
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))
    }

    /// Parse and validate a catalog document
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = Self::read(path)?;
        file.validate()
            .with_context(|| format!("Invalid catalog {}", path.display()))?;

        if file.metadata.total_products != file.products.len() {
            warn!(
                declared = file.metadata.total_products,
                actual = file.products.len(),
                "catalog product count differs from metadata"
            );
        }
        Ok(file)
    }

    /// Seal and write the document atomically, creating parent directories
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = resolve(path.as_ref());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        self.seal();
        let json = serde_json::to_vec_pretty(self)?;
        AtomicFile::new(&path, OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(&json))
            .with_context(|| format!("Failed to write catalog {}", path.display()))?;

        info!(
            path = %path.display(),
            products = self.products.len(),
            "catalog saved"
        );
        Ok(())
    }

    /// Convert to a catalog; duplicate ids are an error, unusable embeddings are dropped
    pub fn to_catalog(&self) -> Result<Catalog> {
        let entries = self.products.iter().map(|p| {
            CatalogEntry::new(
                p.product_id.as_str(),
                p.product_name.as_str(),
                p.category.as_str(),
                p.image_path.as_str(),
                p.vector(),
            )
        });
        let catalog = Catalog::from_entries(entries).context("Failed to build catalog")?;

        let skipped = catalog.len() - catalog.vector_count();
        if skipped > 0 {
            warn!(skipped, "catalog entries without a usable embedding will not be ranked");
        }
        Ok(catalog)
    }
}

// Bare file names have an empty parent, which the temp file needs to be a real directory
fn resolve(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new(".").join(path),
        _ => path.to_path_buf(),
    }
}
