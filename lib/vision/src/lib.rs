//! # vismatch Vision
//!
//! Image decoding, canonicalization and feature extraction.
//!
//! ```rust
//! use vismatch_vision::{CanonicalImage, FeatureExtractor};
//!
//! let extractor = FeatureExtractor::default();
//! let image = CanonicalImage::solid(64, 96, [200, 40, 40]);
//! let vector = extractor.extract_canonical(&image);
//! assert_eq!(vector.dim(), 50);
//! ```

mod color;
pub mod error;
pub mod extractor;
pub mod preprocess;
pub mod stats;
mod structure;

pub use error::{Result, VisionError};
pub use extractor::{ExtractorConfig, FeatureExtractor};
pub use preprocess::{CanonicalImage, Preprocessor, MAX_DIMENSION};
pub use structure::EDGE_THRESHOLD;
