//! Feature extraction
//!
//! [`FeatureExtractor`] turns an image into a [`FeatureVector`] following the
//! layout in [`vismatch_core::layout`]. Extraction after decoding is total:
//! degenerate input yields the fallback vector instead of an error.

use crate::color::ColorSummary;
use crate::error::Result;
use crate::preprocess::{CanonicalImage, Preprocessor, MAX_DIMENSION};
use crate::structure::{write_direction, write_shape, write_texture, EdgeMap};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};
use vismatch_core::{FeatureGroup, FeatureVector, FEATURE_DIM};

/// Extractor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Longest side of the canonical image
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

fn default_max_dimension() -> u32 {
    MAX_DIMENSION
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
        }
    }
}

/// Deterministic image-to-vector extractor
///
/// Holds no mutable state, so one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    preprocessor: Preprocessor,
}

impl FeatureExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            preprocessor: Preprocessor::new(config.max_dimension),
        }
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    /// Canonicalize then extract
    pub fn extract(&self, image: &DynamicImage) -> FeatureVector {
        let canonical = self.preprocessor.canonicalize(image);
        self.extract_canonical(&canonical)
    }

    /// Decode raw bytes then extract; only decoding can fail
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<FeatureVector> {
        let image = self.preprocessor.decode(bytes)?;
        Ok(self.extract(&image))
    }

    /// Open an image file then extract
    pub fn extract_path(&self, path: &Path) -> Result<FeatureVector> {
        let image = self.preprocessor.open(path)?;
        debug!(path = %path.display(), "extracting features");
        Ok(self.extract(&image))
    }

    /// Extract from an already canonical image
    pub fn extract_canonical(&self, image: &CanonicalImage) -> FeatureVector {
        if image.is_empty() {
            warn!(
                width = image.width(),
                height = image.height(),
                "image has no pixels, using fallback vector"
            );
            return FeatureVector::fallback();
        }

        let features = compute(image);
        if features.len() != FEATURE_DIM {
            debug!(len = features.len(), "fitting feature vector to layout");
        }

        let vector = FeatureVector::fitted(features);
        if !vector.is_finite() {
            warn!("non-finite feature value, using fallback vector");
            return FeatureVector::fallback();
        }
        vector
    }
}

/// Write every group in layout order
fn compute(image: &CanonicalImage) -> Vec<f32> {
    let mut out = Vec::with_capacity(FEATURE_DIM);
    let color = ColorSummary::new(image);

    color.write_stats(&mut out);
    debug_assert_eq!(out.len(), FeatureGroup::ColorHistogram.range().start);
    color.write_histograms(&mut out);
    color.write_brightness(&mut out);
    color.write_tone(image, &mut out);
    debug_assert_eq!(out.len(), FeatureGroup::AspectRatio.range().start);

    out.push(image.aspect_ratio() as f32);

    let edges = EdgeMap::new(image);
    edges.write_edges(&mut out);
    debug_assert_eq!(out.len(), FeatureGroup::Texture.range().start);
    write_texture(image, &mut out);
    write_direction(image, &mut out);
    debug_assert_eq!(out.len(), FeatureGroup::Shape.range().start);
    write_shape(image, &edges, color.dynamic_range(), &mut out);

    out
}
