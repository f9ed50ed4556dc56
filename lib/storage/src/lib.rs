pub mod builder;
pub mod catalog_file;
pub mod manager;

pub use builder::{BuildReport, CatalogBuilder, IMAGE_EXTENSIONS};
pub use catalog_file::{
    CatalogFile, CatalogFileError, CatalogMetadata, ProductRecord, EMBEDDING_MODEL,
};
pub use manager::CatalogManager;
