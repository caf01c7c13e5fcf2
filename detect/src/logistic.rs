//! Standardized logistic regression.

use serde::{Deserialize, Serialize};

use crate::classifier::{check_dimension, ClassProbabilities, Classifier};
use crate::error::ClassifierError;

/// `P(AI_GENERATED) = sigmoid(w . z + b)` with `z = (x - mean) / scale`.
///
/// `mean` and `scale` are optional; a zero scale entry is treated as 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LogisticParts")]
pub struct LogisticClassifier {
    weights: Vec<f64>,
    bias: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    mean: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scale: Option<Vec<f64>>,
}

#[derive(Deserialize)]
struct LogisticParts {
    weights: Vec<f64>,
    bias: f64,
    #[serde(default)]
    mean: Option<Vec<f64>>,
    #[serde(default)]
    scale: Option<Vec<f64>>,
}

impl TryFrom<LogisticParts> for LogisticClassifier {
    type Error = ClassifierError;

    fn try_from(raw: LogisticParts) -> Result<Self, Self::Error> {
        let model = Self {
            weights: raw.weights,
            bias: raw.bias,
            mean: raw.mean,
            scale: raw.scale,
        };
        model.validate()?;
        Ok(model)
    }
}

impl LogisticClassifier {
    pub fn new(weights: Vec<f64>, bias: f64) -> Result<Self, ClassifierError> {
        let model = Self {
            weights,
            bias,
            mean: None,
            scale: None,
        };
        model.validate()?;
        Ok(model)
    }

    /// Adds per-feature standardization.
    pub fn with_standardization(
        mut self,
        mean: Vec<f64>,
        scale: Vec<f64>,
    ) -> Result<Self, ClassifierError> {
        self.mean = Some(mean);
        self.scale = Some(scale);
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ClassifierError> {
        let n = self.weights.len();
        if n == 0 {
            return Err(ClassifierError::InvalidModel("no weights".into()));
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(ClassifierError::InvalidModel("non-finite weight".into()));
        }
        for (name, v) in [("mean", &self.mean), ("scale", &self.scale)] {
            if let Some(v) = v {
                if v.len() != n {
                    return Err(ClassifierError::InvalidModel(format!(
                        "{name} has {} entries, weights have {n}",
                        v.len()
                    )));
                }
                if v.iter().any(|x| !x.is_finite()) {
                    return Err(ClassifierError::InvalidModel(format!("non-finite {name}")));
                }
            }
        }
        Ok(())
    }

    fn decision(&self, features: &[f32]) -> f64 {
        self.weights
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let mut z = features[i] as f64;
                if let Some(mean) = &self.mean {
                    z -= mean[i];
                }
                if let Some(scale) = &self.scale {
                    if scale[i] != 0.0 {
                        z /= scale[i];
                    }
                }
                w * z
            })
            .sum::<f64>()
            + self.bias
    }
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticClassifier {
    fn num_features(&self) -> usize {
        self.weights.len()
    }

    fn predict_probabilities(&self, features: &[f32]) -> Result<ClassProbabilities, ClassifierError> {
        check_dimension(self.weights.len(), features)?;
        let decision = self.decision(features);
        if decision.is_nan() {
            return Err(ClassifierError::BadOutput("decision function is NaN".into()));
        }
        let ai = sigmoid(decision);
        ClassProbabilities::new(1.0 - ai, ai)
    }
}
