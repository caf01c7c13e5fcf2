use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classifier::{ClassLabel, ClassProbabilities};
use crate::error::PredictError;

const AI_GENERATED_EXPLANATION: &str = "Pitch and energy are unusually consistent across the clip; \
     this regularity is typical of synthesized speech.";

const HUMAN_EXPLANATION: &str = "Pitch, energy and spectral shape vary naturally over the clip, \
     as expected from a human speaker.";

/// Outcome label reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    Human,
    AiGenerated,
    Error,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Label::Human => "HUMAN",
            Label::AiGenerated => "AI_GENERATED",
            Label::Error => "ERROR",
        })
    }
}

impl From<ClassLabel> for Label {
    fn from(label: ClassLabel) -> Self {
        match label {
            ClassLabel::Human => Label::Human,
            ClassLabel::AiGenerated => Label::AiGenerated,
        }
    }
}

/// Final result of one prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: Label,
    /// Probability of the winning class; 0.0 for [`Label::Error`].
    pub confidence: f64,
    pub explanation: String,
}

impl PredictionResult {
    pub fn from_probabilities(probs: &ClassProbabilities) -> Self {
        let winner = probs.argmax();
        let explanation = match winner {
            ClassLabel::AiGenerated => AI_GENERATED_EXPLANATION,
            ClassLabel::Human => HUMAN_EXPLANATION,
        };
        Self {
            label: winner.into(),
            confidence: probs.get(winner),
            explanation: explanation.to_string(),
        }
    }

    pub fn from_error(err: &PredictError) -> Self {
        Self {
            label: Label::Error,
            confidence: 0.0,
            explanation: format!("{} at {} stage: {err}", err.kind(), err.stage()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.label == Label::Error
    }
}
