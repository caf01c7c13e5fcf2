//! The fixed-layout feature vector consumed by classifiers.
//!
//! Layout (indices are a contract with trained classifiers):
//!
//! | Range   | Feature                         |
//! |---------|---------------------------------|
//! | 0..40   | MFCC coefficient means          |
//! | 40..80  | MFCC coefficient std-devs       |
//! | 80      | spectral centroid mean (Hz)     |
//! | 81      | spectral roll-off mean (Hz)     |
//! | 82      | zero-crossing rate mean         |
//! | 83      | RMS energy mean                 |
//! | 84      | pitch mean (Hz), 0 if unvoiced  |
//! | 85      | pitch std-dev (Hz), 0 if unvoiced |

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::FeatureError;

/// Number of cepstral coefficients summarized.
pub const N_MFCC: usize = 40;

/// Total length of a [`FeatureVector`].
pub const FEATURE_LEN: usize = 2 * N_MFCC + 6;

pub const MFCC_MEAN_OFFSET: usize = 0;
pub const MFCC_STD_OFFSET: usize = N_MFCC;
pub const SPECTRAL_CENTROID: usize = 2 * N_MFCC;
pub const SPECTRAL_ROLLOFF: usize = SPECTRAL_CENTROID + 1;
pub const ZERO_CROSSING_RATE: usize = SPECTRAL_CENTROID + 2;
pub const RMS: usize = SPECTRAL_CENTROID + 3;
pub const PITCH_MEAN: usize = SPECTRAL_CENTROID + 4;
pub const PITCH_STD: usize = SPECTRAL_CENTROID + 5;

/// Stable name of the feature at `index`, e.g. `mfcc_mean_3` or `pitch_std`.
pub fn feature_name(index: usize) -> Option<String> {
    let name = match index {
        i if i < MFCC_STD_OFFSET => format!("mfcc_mean_{i}"),
        i if i < SPECTRAL_CENTROID => format!("mfcc_std_{}", i - MFCC_STD_OFFSET),
        SPECTRAL_CENTROID => "spectral_centroid".into(),
        SPECTRAL_ROLLOFF => "spectral_rolloff".into(),
        ZERO_CROSSING_RATE => "zero_crossing_rate".into(),
        RMS => "rms".into(),
        PITCH_MEAN => "pitch_mean".into(),
        PITCH_STD => "pitch_std".into(),
        _ => return None,
    };
    Some(name)
}

/// 86 finite f32 features in the fixed layout above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn mfcc_means(&self) -> &[f32] {
        &self.0[MFCC_MEAN_OFFSET..MFCC_STD_OFFSET]
    }

    pub fn mfcc_stds(&self) -> &[f32] {
        &self.0[MFCC_STD_OFFSET..SPECTRAL_CENTROID]
    }

    pub fn spectral_centroid(&self) -> f32 {
        self.0[SPECTRAL_CENTROID]
    }

    pub fn spectral_rolloff(&self) -> f32 {
        self.0[SPECTRAL_ROLLOFF]
    }

    pub fn zero_crossing_rate(&self) -> f32 {
        self.0[ZERO_CROSSING_RATE]
    }

    pub fn rms(&self) -> f32 {
        self.0[RMS]
    }

    pub fn pitch_mean(&self) -> f32 {
        self.0[PITCH_MEAN]
    }

    pub fn pitch_std(&self) -> f32 {
        self.0[PITCH_STD]
    }

    /// `(name, value)` pairs in layout order.
    pub fn named(&self) -> impl Iterator<Item = (String, f32)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| feature_name(i).map(|name| (name, v)))
    }
}

impl TryFrom<Vec<f32>> for FeatureVector {
    type Error = FeatureError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        if values.len() != FEATURE_LEN {
            return Err(FeatureError::LengthMismatch {
                expected: FEATURE_LEN,
                got: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(FeatureError::NonFinite {
                index,
                name: feature_name(index).unwrap_or_default(),
            });
        }
        Ok(Self(values))
    }
}

impl From<FeatureVector> for Vec<f32> {
    fn from(v: FeatureVector) -> Self {
        v.0
    }
}

impl AsRef<[f32]> for FeatureVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

impl Index<usize> for FeatureVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}
