use voxguard_features::FeatureVector;

use crate::classifier::{check_dimension, ClassProbabilities, Classifier};
use crate::error::ClassifierError;

/// Runs `classifier` on a single feature vector.
///
/// Checks the vector length against the model before calling it; the
/// returned probabilities are the classifier's own.
pub fn classify(
    features: &FeatureVector,
    classifier: &dyn Classifier,
) -> Result<ClassProbabilities, ClassifierError> {
    check_dimension(classifier.num_features(), features.as_slice())?;
    classifier.predict_probabilities(features.as_slice())
}
