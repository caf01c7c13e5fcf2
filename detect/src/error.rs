use std::fmt;

use thiserror::Error;
use voxguard_audio::AudioError;
use voxguard_features::FeatureError;

/// Errors raised by a classifier or while loading one.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("no classifier loaded")]
    NotLoaded,

    #[error("a classifier is already installed")]
    AlreadyInstalled,

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("classifier returned invalid probabilities: {0}")]
    BadOutput(String),

    #[error("parse classifier artifact: {0}")]
    Artifact(#[from] serde_json::Error),
}

/// Errors building a [`Detector`](crate::Detector) from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("normalizer config: {0}")]
    Audio(#[from] AudioError),

    #[error("extractor config: {0}")]
    Features(#[from] FeatureError),

    #[error("classifier: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("normalizer outputs {normalizer} Hz but the extractor expects {extractor} Hz")]
    SampleRateMismatch { normalizer: u32, extractor: u32 },
}

/// Pipeline stage a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
    Extract,
    Classify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Normalize => "normalize",
            Stage::Extract => "extract",
            Stage::Classify => "classify",
        })
    }
}

/// Failure taxonomy exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Malformed, unsupported or empty encoded audio.
    Decode,
    /// Less than one second of audio reached the extractor.
    InsufficientAudio,
    /// Numeric failure while computing features.
    Extraction,
    /// The classifier rejected the input or produced unusable output.
    Classifier,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Decode => "DecodeFailure",
            FailureKind::InsufficientAudio => "InsufficientAudioFailure",
            FailureKind::Extraction => "ExtractionFailure",
            FailureKind::Classifier => "ClassifierFailure",
        })
    }
}

/// A terminal failure of one prediction request.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("decode failed: {0}")]
    Decode(#[from] AudioError),

    #[error("insufficient audio: {0}")]
    InsufficientAudio(#[source] FeatureError),

    #[error("feature extraction failed: {0}")]
    Extraction(#[source] FeatureError),

    #[error("classifier failed: {0}")]
    Classifier(#[from] ClassifierError),
}

impl From<FeatureError> for PredictError {
    fn from(err: FeatureError) -> Self {
        if err.is_insufficient_audio() {
            PredictError::InsufficientAudio(err)
        } else {
            PredictError::Extraction(err)
        }
    }
}

impl PredictError {
    pub fn stage(&self) -> Stage {
        match self {
            PredictError::Decode(_) => Stage::Normalize,
            PredictError::InsufficientAudio(_) | PredictError::Extraction(_) => Stage::Extract,
            PredictError::Classifier(_) => Stage::Classify,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            PredictError::Decode(_) => FailureKind::Decode,
            PredictError::InsufficientAudio(_) => FailureKind::InsufficientAudio,
            PredictError::Extraction(_) => FailureKind::Extraction,
            PredictError::Classifier(_) => FailureKind::Classifier,
        }
    }
}
