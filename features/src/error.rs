use thiserror::Error;

/// Errors returned by feature extraction.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("audio too short: need at least {min_samples} samples, got {got_samples}")]
    InsufficientAudio { min_samples: usize, got_samples: usize },

    #[error("input sample {index} is not finite")]
    NonFiniteInput { index: usize },

    #[error("feature {name} (index {index}) is not finite")]
    NonFinite { index: usize, name: String },

    #[error("feature vector length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl FeatureError {
    /// True when the failure is a too-short input rather than a numeric problem.
    pub fn is_insufficient_audio(&self) -> bool {
        matches!(self, FeatureError::InsufficientAudio { .. })
    }
}
