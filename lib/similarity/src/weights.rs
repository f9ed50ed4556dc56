//! Per-dimension weights
//!
//! The canonical table emphasizes silhouette over color: a query for a red
//! shirt should rank a blue shirt above a red dress.

use serde::{Deserialize, Serialize};
use vismatch_core::{Error, FeatureGroup, Result, FEATURE_DIM};

/// One positive weight per feature dimension, aligned to the layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct WeightTable([f32; FEATURE_DIM]);

impl WeightTable {
    /// Weight applied to every dimension of a group in the canonical table
    pub const fn canonical_group_weight(group: FeatureGroup) -> f32 {
        match group {
            FeatureGroup::ColorStats => 0.05,
            FeatureGroup::ColorHistogram => 0.1,
            FeatureGroup::Brightness => 0.2,
            FeatureGroup::ColorTone => 0.1,
            FeatureGroup::AspectRatio => 8.0,
            FeatureGroup::Edge => 5.0,
            FeatureGroup::Texture => 4.0,
            FeatureGroup::Direction => 6.0,
            FeatureGroup::Shape => 5.5,
        }
    }

    /// Shape-weighted table used for garment matching
    pub fn canonical() -> Self {
        let mut weights = [0.0; FEATURE_DIM];
        for group in FeatureGroup::ALL {
            weights[group.range()].fill(Self::canonical_group_weight(group));
        }
        Self(weights)
    }

    /// All weights 1.0, which reduces weighted cosine to plain cosine
    pub fn uniform() -> Self {
        Self([1.0; FEATURE_DIM])
    }

    /// Validate a custom table: every weight must be finite and positive
    pub fn new(weights: [f32; FEATURE_DIM]) -> Result<Self> {
        if let Some((index, &value)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w <= 0.0)
        {
            return Err(Error::InvalidWeight { index, value });
        }
        Ok(Self(weights))
    }

    /// Copy of this table with every dimension of `group` set to `weight`
    pub fn with_group(mut self, group: FeatureGroup, weight: f32) -> Result<Self> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(Error::InvalidWeight {
                index: group.range().start,
                value: weight,
            });
        }
        self.0[group.range()].fill(weight);
        Ok(self)
    }

    /// Mean weight over a group's dimensions
    pub fn group_weight(&self, group: FeatureGroup) -> f32 {
        let slice = &self.0[group.range()];
        slice.iter().sum::<f32>() / slice.len() as f32
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::canonical()
    }
}

impl TryFrom<Vec<f32>> for WeightTable {
    type Error = Error;

    fn try_from(values: Vec<f32>) -> Result<Self> {
        let weights: [f32; FEATURE_DIM] =
            values
                .try_into()
                .map_err(|v: Vec<f32>| Error::InvalidDimension {
                    expected: FEATURE_DIM,
                    actual: v.len(),
                })?;
        Self::new(weights)
    }
}

impl From<WeightTable> for Vec<f32> {
    fn from(table: WeightTable) -> Self {
        table.0.to_vec()
    }
}
