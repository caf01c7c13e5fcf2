use std::sync::Arc;

use tracing::{debug, warn};
use voxguard_audio::{ContainerFormat, NormalizeConfig, Normalizer, Waveform};
use voxguard_features::{Extractor, ExtractorConfig, FeatureVector};

use crate::adapter::classify;
use crate::classifier::{ClassProbabilities, Classifier};
use crate::config::{check_lockstep, PipelineConfig};
use crate::error::{ConfigError, PredictError};
use crate::prediction::PredictionResult;
use crate::registry;

/// Successful pipeline output with its intermediate values.
#[derive(Debug, Clone)]
pub struct Detection {
    pub features: FeatureVector,
    pub probabilities: ClassProbabilities,
    pub result: PredictionResult,
}

/// Normalize, extract and classify in sequence.
///
/// A `Detector` is immutable after construction; share it behind an `Arc`
/// to serve concurrent requests.
pub struct Detector {
    normalizer: Normalizer,
    extractor: Extractor,
    classifier: Arc<dyn Classifier>,
}

impl Detector {
    pub fn new(cfg: &PipelineConfig, classifier: Arc<dyn Classifier>) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Self::with_stages(cfg.normalize_config(), cfg.extractor_config(), classifier)
    }

    /// Builds a detector around the classifier in the process registry.
    pub fn from_registry(cfg: &PipelineConfig) -> Result<Self, ConfigError> {
        Self::new(cfg, registry::installed()?)
    }

    /// Builds a detector from explicit stage configs, which must share a sample rate.
    pub fn with_stages(
        normalize: NormalizeConfig,
        extract: ExtractorConfig,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, ConfigError> {
        check_lockstep(&normalize, &extract)?;
        Ok(Self {
            normalizer: Normalizer::new(normalize)?,
            extractor: Extractor::new(extract)?,
            classifier,
        })
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    /// Classifies encoded audio. Never fails: stage errors become an `ERROR` result.
    pub fn predict(&self, bytes: &[u8]) -> PredictionResult {
        finish(self.try_predict(bytes))
    }

    /// Like [`predict`](Self::predict) with a declared container format.
    pub fn predict_as(&self, bytes: &[u8], format: Option<ContainerFormat>) -> PredictionResult {
        finish(self.try_predict_as(bytes, format))
    }

    /// Classifies an already-canonical waveform, skipping decode.
    pub fn predict_waveform(&self, waveform: &Waveform) -> PredictionResult {
        finish(self.detect_waveform(waveform))
    }

    /// Runs all stages and returns the typed failure instead of an `ERROR` result.
    pub fn try_predict(&self, bytes: &[u8]) -> Result<Detection, PredictError> {
        self.try_predict_as(bytes, None)
    }

    pub fn try_predict_as(
        &self,
        bytes: &[u8],
        format: Option<ContainerFormat>,
    ) -> Result<Detection, PredictError> {
        let waveform = self.normalizer.normalize_as(bytes, format)?;
        self.detect_waveform(&waveform)
    }

    /// Feature extraction and classification of a canonical waveform.
    pub fn detect_waveform(&self, waveform: &Waveform) -> Result<Detection, PredictError> {
        let features = self.extractor.extract(waveform.samples())?;
        let probabilities = classify(&features, self.classifier.as_ref())?;
        let result = PredictionResult::from_probabilities(&probabilities);
        debug!(
            label = ?result.label,
            confidence = result.confidence,
            "prediction complete"
        );
        Ok(Detection {
            features,
            probabilities,
            result,
        })
    }
}

fn finish(outcome: Result<Detection, PredictError>) -> PredictionResult {
    match outcome {
        Ok(detection) => detection.result,
        Err(err) => {
            warn!(stage = %err.stage(), kind = %err.kind(), error = %err, "prediction failed");
            PredictionResult::from_error(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassifierError;
    use crate::logistic::LogisticClassifier;
    use crate::prediction::Label;
    use voxguard_features::FEATURE_LEN;

    fn detector(weights: Vec<f64>) -> Detector {
        let model = LogisticClassifier::new(weights, 0.0).unwrap();
        Detector::new(&PipelineConfig::default(), Arc::new(model)).unwrap()
    }

    #[test]
    fn decode_failure_short_circuits() {
        let d = detector(vec![0.0; FEATURE_LEN]);
        let r = d.predict(b"");
        assert_eq!(r.label, Label::Error);
        assert_eq!(r.confidence, 0.0);
        assert!(matches!(d.try_predict(b""), Err(PredictError::Decode(_))));
    }

    #[test]
    fn short_waveform_is_insufficient() {
        let d = detector(vec![0.0; FEATURE_LEN]);
        let waveform = Waveform::new(vec![0.0; 8000], 16000);
        assert!(matches!(
            d.detect_waveform(&waveform),
            Err(PredictError::InsufficientAudio(_))
        ));
        assert!(d.predict_waveform(&waveform).is_error());
    }

    #[test]
    fn classifier_dimension_mismatch_is_a_classifier_failure() {
        let d = detector(vec![0.0; 10]);
        let waveform = Waveform::new(vec![0.0; 16000], 16000);
        assert!(matches!(
            d.detect_waveform(&waveform),
            Err(PredictError::Classifier(ClassifierError::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn silent_waveform_is_classified() {
        let d = detector(vec![0.0; FEATURE_LEN]);
        let waveform = Waveform::new(vec![0.0; 64000], 16000);
        let detection = d.detect_waveform(&waveform).unwrap();
        assert_eq!(detection.features.pitch_mean(), 0.0);
        assert_eq!(detection.result.label, Label::Human);
        assert_eq!(detection.result.confidence, 0.5);
    }

    #[test]
    fn mismatched_stages_are_rejected() {
        let model: Arc<dyn Classifier> =
            Arc::new(LogisticClassifier::new(vec![0.0; FEATURE_LEN], 0.0).unwrap());
        let extract = ExtractorConfig {
            sample_rate: 22050,
            ..ExtractorConfig::default()
        };
        assert!(matches!(
            Detector::with_stages(NormalizeConfig::default(), extract, model),
            Err(ConfigError::SampleRateMismatch { .. })
        ));
    }
}
