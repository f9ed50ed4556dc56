//! # vismatch Core
//!
//! Core data types shared by every vismatch crate.
//!
//! - [`FeatureVector`] - a fixed-length 50-value image fingerprint
//! - [`FeatureGroup`] - the index layout of a fingerprint
//! - [`CatalogEntry`] - an identified, named, categorized fingerprint
//! - [`Catalog`] - an ordered, read-only collection of entries
//!
//! ## Example
//!
//! ```rust
//! use vismatch_core::{Catalog, CatalogEntry, FeatureVector};
//!
//! let entry = CatalogEntry::new("1", "Linen shirt", "Shirts", "images/1.jpg",
//!     Some(FeatureVector::fallback()));
//! let catalog = Catalog::from_entries(vec![entry]).unwrap();
//! assert_eq!(catalog.vector_count(), 1);
//! ```

pub mod catalog;
pub mod entry;
pub mod error;
pub mod filter;
pub mod layout;
pub mod vector;

pub use catalog::Catalog;
pub use entry::{CatalogEntry, EntryId, UNCATEGORIZED};
pub use error::{Error, Result};
pub use filter::{CategoryCondition, CategoryFilter, EntryFilter};
pub use layout::{FeatureGroup, FALLBACK_VALUE, FEATURE_DIM, FEATURE_LAYOUT_VERSION, PAD_VALUE};
pub use vector::FeatureVector;
