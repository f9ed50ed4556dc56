use crate::layout::{FALLBACK_VALUE, FEATURE_DIM, PAD_VALUE};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A fixed-length image fingerprint of [`FEATURE_DIM`] values
///
/// Serialized as a plain array; deserializing any other length fails.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct FeatureVector {
    data: Vec<f32>,
}

impl FeatureVector {
    /// Wrap exactly [`FEATURE_DIM`] values
    pub fn new(data: Vec<f32>) -> Result<Self> {
        if data.len() != FEATURE_DIM {
            return Err(Error::InvalidDimension {
                expected: FEATURE_DIM,
                actual: data.len(),
            });
        }
        Ok(Self { data })
    }

    /// Pad with [`PAD_VALUE`] or truncate so the result has exactly [`FEATURE_DIM`] values
    #[must_use]
    pub fn fitted(mut data: Vec<f32>) -> Self {
        data.resize(FEATURE_DIM, PAD_VALUE);
        Self { data }
    }

    /// Vector returned when extraction cannot run
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            data: vec![FALLBACK_VALUE; FEATURE_DIM],
        }
    }

    #[inline]
    pub fn from_slice(data: &[f32]) -> Result<Self> {
        Self::new(data.to_vec())
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, f32> {
        self.data.iter()
    }

    pub fn is_fallback(&self) -> bool {
        self.data.iter().all(|&v| v == FALLBACK_VALUE)
    }

    /// Whether every value is finite
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Little-endian bytes of every value, for bit-exact comparisons
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }
}

impl TryFrom<Vec<f32>> for FeatureVector {
    type Error = Error;

    fn try_from(data: Vec<f32>) -> Result<Self> {
        Self::new(data)
    }
}

impl From<FeatureVector> for Vec<f32> {
    fn from(v: FeatureVector) -> Self {
        v.data
    }
}

impl AsRef<[f32]> for FeatureVector {
    fn as_ref(&self) -> &[f32] {
        &self.data
    }
}

impl Index<usize> for FeatureVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.data[index]
    }
}
