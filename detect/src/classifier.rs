use std::fmt;

use crate::error::ClassifierError;

/// Tolerance on `sum(probabilities) == 1`.
const SUM_TOLERANCE: f64 = 1e-6;

/// Class predicted by a [`Classifier`]. Discriminants are the training label indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassLabel {
    Human = 0,
    AiGenerated = 1,
}

impl ClassLabel {
    pub const ALL: [ClassLabel; 2] = [ClassLabel::Human, ClassLabel::AiGenerated];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClassLabel::Human => "HUMAN",
            ClassLabel::AiGenerated => "AI_GENERATED",
        })
    }
}

/// Probability per [`ClassLabel`], indexed by [`ClassLabel::index`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities([f64; 2]);

impl ClassProbabilities {
    /// Validates that both entries are finite, in [0, 1], and sum to 1.
    pub fn new(human: f64, ai_generated: f64) -> Result<Self, ClassifierError> {
        let probs = [human, ai_generated];
        if let Some(p) = probs.iter().find(|p| !p.is_finite() || !(0.0..=1.0).contains(*p)) {
            return Err(ClassifierError::BadOutput(format!("probability {p} out of range")));
        }
        let sum = human + ai_generated;
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(ClassifierError::BadOutput(format!("probabilities sum to {sum}")));
        }
        Ok(Self(probs))
    }

    /// Builds from a slice in label-index order.
    pub fn from_slice(probs: &[f64]) -> Result<Self, ClassifierError> {
        match probs {
            [human, ai] => Self::new(*human, *ai),
            _ => Err(ClassifierError::BadOutput(format!(
                "expected 2 class probabilities, got {}",
                probs.len()
            ))),
        }
    }

    pub fn get(&self, label: ClassLabel) -> f64 {
        self.0[label.index()]
    }

    pub fn as_array(&self) -> [f64; 2] {
        self.0
    }

    /// Most probable label; ties go to the lower index ([`ClassLabel::Human`]).
    pub fn argmax(&self) -> ClassLabel {
        if self.0[1] > self.0[0] {
            ClassLabel::AiGenerated
        } else {
            ClassLabel::Human
        }
    }

    /// Probability of the [`argmax`](Self::argmax) label.
    pub fn max(&self) -> f64 {
        self.get(self.argmax())
    }
}

/// A trained two-class classifier over fixed-length feature vectors.
///
/// Implementations are immutable once built and must be safe to share
/// across threads; every method takes `&self`.
pub trait Classifier: Send + Sync {
    /// Length of the input vector the model was trained on.
    fn num_features(&self) -> usize;

    /// Class probabilities for one sample.
    fn predict_probabilities(&self, features: &[f32]) -> Result<ClassProbabilities, ClassifierError>;

    /// Most likely class for one sample.
    fn predict(&self, features: &[f32]) -> Result<ClassLabel, ClassifierError> {
        Ok(self.predict_probabilities(features)?.argmax())
    }
}

/// Rejects inputs whose length differs from the model's.
pub(crate) fn check_dimension(expected: usize, features: &[f32]) -> Result<(), ClassifierError> {
    if features.len() != expected {
        return Err(ClassifierError::DimensionMismatch {
            expected,
            got: features.len(),
        });
    }
    Ok(())
}
