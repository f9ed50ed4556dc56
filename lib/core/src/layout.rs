//! Feature layout
//!
//! The index layout of a [`FeatureVector`](crate::FeatureVector) is a contract
//! shared by the extractor (which writes it), the weight table (which is aligned
//! to it) and every stored catalog (whose vectors must be index-compatible with
//! freshly extracted query vectors).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Number of dimensions in every feature vector
pub const FEATURE_DIM: usize = 50;

/// Tag stored alongside catalogs so vectors from different layouts are never mixed
pub const FEATURE_LAYOUT_VERSION: &str = "shape-weighted-v1";

/// Value used for every dimension when extraction cannot run
pub const FALLBACK_VALUE: f32 = 0.1;

/// Value appended when an extraction produces fewer than [`FEATURE_DIM`] values
pub const PAD_VALUE: f32 = 0.05;

/// Semantic group of feature dimensions, in layout order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    /// Per-channel mean and standard deviation
    ColorStats,
    /// 5-bin histogram per channel
    ColorHistogram,
    /// Mean and spread of per-pixel brightness
    Brightness,
    /// Dominance flags, warm/cool tone, saturation and color complexity
    ColorTone,
    /// Width over height
    AspectRatio,
    /// Gradient magnitude statistics and histogram
    Edge,
    /// 8x8 block variance statistics
    Texture,
    /// Horizontal, vertical and diagonal energy split
    Direction,
    /// Silhouette indicators
    Shape,
}

impl FeatureGroup {
    /// All groups in layout order
    pub const ALL: [FeatureGroup; 9] = [
        FeatureGroup::ColorStats,
        FeatureGroup::ColorHistogram,
        FeatureGroup::Brightness,
        FeatureGroup::ColorTone,
        FeatureGroup::AspectRatio,
        FeatureGroup::Edge,
        FeatureGroup::Texture,
        FeatureGroup::Direction,
        FeatureGroup::Shape,
    ];

    /// Index range this group occupies in a feature vector
    pub const fn range(self) -> Range<usize> {
        match self {
            FeatureGroup::ColorStats => 0..6,
            FeatureGroup::ColorHistogram => 6..21,
            FeatureGroup::Brightness => 21..23,
            FeatureGroup::ColorTone => 23..31,
            FeatureGroup::AspectRatio => 31..32,
            FeatureGroup::Edge => 32..40,
            FeatureGroup::Texture => 40..42,
            FeatureGroup::Direction => 42..45,
            FeatureGroup::Shape => 45..50,
        }
    }

    #[inline]
    pub const fn len(self) -> usize {
        let range = self.range();
        range.end - range.start
    }

    /// Group owning the given dimension, if it is inside the layout
    pub fn of_index(index: usize) -> Option<FeatureGroup> {
        Self::ALL.into_iter().find(|g| g.range().contains(&index))
    }

    /// Color-derived groups are weak discriminators for garment type
    pub const fn is_color(self) -> bool {
        matches!(
            self,
            FeatureGroup::ColorStats
                | FeatureGroup::ColorHistogram
                | FeatureGroup::Brightness
                | FeatureGroup::ColorTone
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            FeatureGroup::ColorStats => "color_stats",
            FeatureGroup::ColorHistogram => "color_histogram",
            FeatureGroup::Brightness => "brightness",
            FeatureGroup::ColorTone => "color_tone",
            FeatureGroup::AspectRatio => "aspect_ratio",
            FeatureGroup::Edge => "edge",
            FeatureGroup::Texture => "texture",
            FeatureGroup::Direction => "direction",
            FeatureGroup::Shape => "shape",
        }
    }
}

impl fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_tile_the_layout() {
        let mut next = 0;
        for group in FeatureGroup::ALL {
            let range = group.range();
            assert_eq!(range.start, next, "gap before {}", group);
            assert!(range.end > range.start);
            next = range.end;
        }
        assert_eq!(next, FEATURE_DIM);
    }

    #[test]
    fn test_of_index() {
        assert_eq!(FeatureGroup::of_index(0), Some(FeatureGroup::ColorStats));
        assert_eq!(FeatureGroup::of_index(31), Some(FeatureGroup::AspectRatio));
        assert_eq!(FeatureGroup::of_index(44), Some(FeatureGroup::Direction));
        assert_eq!(FeatureGroup::of_index(49), Some(FeatureGroup::Shape));
        assert_eq!(FeatureGroup::of_index(50), None);
    }

    #[test]
    fn test_group_lengths() {
        let total: usize = FeatureGroup::ALL.iter().map(|g| g.len()).sum();
        assert_eq!(total, FEATURE_DIM);
        assert_eq!(FeatureGroup::ColorHistogram.len(), 15);
        assert_eq!(FeatureGroup::AspectRatio.len(), 1);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&FeatureGroup::ColorHistogram).unwrap();
        assert_eq!(json, "\"color_histogram\"");
    }
}
