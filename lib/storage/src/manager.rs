use crate::catalog_file::CatalogFile;
use anyhow::Result;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use vismatch_core::{Catalog, FEATURE_LAYOUT_VERSION};

struct Loaded {
    catalog: Arc<Catalog>,
    /// Layout tag of the document the catalog came from
    layout: Option<String>,
}

impl Loaded {
    fn read(path: &Path) -> Result<Self> {
        let file = CatalogFile::load(path)?;
        let catalog = file.to_catalog()?;
        info!(
            path = %path.display(),
            entries = catalog.len(),
            with_vectors = catalog.vector_count(),
            "catalog loaded"
        );
        Ok(Self {
            catalog: Arc::new(catalog),
            layout: file.metadata.feature_layout,
        })
    }
}

/// Owns the catalog file on disk and the catalog snapshot shared with readers
///
/// Readers take an `Arc<Catalog>` and keep using it for as long as they like;
/// reloads build the new catalog off to the side and swap the pointer, so a
/// search never sees a half-loaded catalog.
pub struct CatalogManager {
    path: PathBuf,
    current: RwLock<Loaded>,
}

impl CatalogManager {
    /// Load the catalog at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let loaded = Loaded::read(&path)?;
        Ok(Self {
            path,
            current: RwLock::new(loaded),
        })
    }

    /// Manage an in-memory catalog that will be saved to `path`
    pub fn with_catalog<P: AsRef<Path>>(path: P, catalog: Catalog) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            current: RwLock::new(Loaded {
                catalog: Arc::new(catalog),
                layout: Some(FEATURE_LAYOUT_VERSION.to_string()),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current catalog
    #[inline]
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current.read().catalog.clone()
    }

    /// Layout tag the current catalog is persisted with; `None` for untagged documents
    pub fn layout(&self) -> Option<String> {
        self.current.read().layout.clone()
    }

    /// Re-read the catalog file; on failure the current snapshot stays in place
    pub fn reload(&self) -> Result<Arc<Catalog>> {
        let loaded = match Loaded::read(&self.path) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "catalog reload failed, keeping current snapshot");
                return Err(e);
            }
        };
        let catalog = loaded.catalog.clone();
        *self.current.write() = loaded;
        info!(entries = catalog.len(), "catalog reloaded");
        Ok(catalog)
    }

    /// Swap in a new catalog, returning the previous snapshot
    ///
    /// The layout tag is kept: the new entries are assumed to come from the
    /// same extractor as the ones they replace.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let catalog = Arc::new(catalog);
        let entries = catalog.len();
        let previous = std::mem::replace(&mut self.current.write().catalog, catalog);
        info!(entries, "catalog replaced");
        previous
    }

    /// Write the current snapshot to the catalog file, keeping its layout tag
    pub fn persist(&self) -> Result<()> {
        let (snapshot, layout) = {
            let current = self.current.read();
            (current.catalog.clone(), current.layout.clone())
        };
        let mut file = CatalogFile::from_catalog(&snapshot);
        file.metadata.feature_layout = layout;
        file.save(&self.path)
    }
}
