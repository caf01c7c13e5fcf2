//! JSON classifier artifacts.
//!
//! ```json
//! {"kind": "logistic", "weights": [...], "bias": 0.1}
//! {"kind": "forest", "n_features": 86, "trees": [{"children_left": [...], ...}]}
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::Classifier;
use crate::error::ClassifierError;
use crate::forest::ForestClassifier;
use crate::logistic::LogisticClassifier;

/// A persisted classifier, tagged by model family.
///
/// Deserializing an artifact validates the model it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    Forest(ForestClassifier),
    Logistic(LogisticClassifier),
}

impl ClassifierArtifact {
    /// Parses and validates an artifact.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ClassifierError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, ClassifierError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierArtifact::Forest(_) => "forest",
            ClassifierArtifact::Logistic(_) => "logistic",
        }
    }

    pub fn into_classifier(self) -> Box<dyn Classifier> {
        match self {
            ClassifierArtifact::Forest(f) => Box::new(f),
            ClassifierArtifact::Logistic(l) => Box::new(l),
        }
    }
}

/// Loads a classifier from JSON artifact bytes.
pub fn load_classifier_json(bytes: &[u8]) -> Result<Box<dyn Classifier>, ClassifierError> {
    let artifact = ClassifierArtifact::from_json(bytes)?;
    debug!(kind = artifact.kind(), bytes = bytes.len(), "loaded classifier artifact");
    Ok(artifact.into_classifier())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassLabel;
    use crate::forest::DecisionTree;

    #[test]
    fn loads_logistic() {
        let json = br#"{"kind": "logistic", "weights": [1.0, -1.0], "bias": 0.0}"#;
        let model = load_classifier_json(json).unwrap();
        assert_eq!(model.num_features(), 2);
        assert_eq!(model.predict(&[3.0, 1.0]).unwrap(), ClassLabel::AiGenerated);
        assert_eq!(model.predict(&[1.0, 3.0]).unwrap(), ClassLabel::Human);
    }

    #[test]
    fn loads_forest() {
        let json = br#"{
            "kind": "forest",
            "n_features": 1,
            "trees": [{
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [0, -2, -2],
                "threshold": [0.5, -2.0, -2.0],
                "value": [[0, 0], [10, 0], [0, 10]]
            }]
        }"#;
        let model = load_classifier_json(json).unwrap();
        assert_eq!(model.predict(&[0.0]).unwrap(), ClassLabel::Human);
        assert_eq!(model.predict(&[1.0]).unwrap(), ClassLabel::AiGenerated);
    }

    #[test]
    fn writes_what_it_reads() {
        let forest = ForestClassifier::new(
            2,
            vec![DecisionTree::stump(1, 0.0, [1.0, 0.0], [0.0, 1.0])],
        )
        .unwrap();
        let artifact = ClassifierArtifact::Forest(forest);
        let json = artifact.to_json().unwrap();
        assert!(String::from_utf8_lossy(&json).contains(r#""kind":"forest""#));
        assert_eq!(ClassifierArtifact::from_json(&json).unwrap(), artifact);
    }

    #[test]
    fn rejects_bad_artifacts() {
        assert!(matches!(
            load_classifier_json(b"not json"),
            Err(ClassifierError::Artifact(_))
        ));
        assert!(matches!(
            load_classifier_json(br#"{"kind": "svm"}"#),
            Err(ClassifierError::Artifact(_))
        ));
        // Parses, but the tree references a feature the model does not have.
        let json = br#"{"kind": "forest", "n_features": 1, "trees": [{
            "children_left": [1, -1, -1], "children_right": [2, -1, -1],
            "feature": [3, -2, -2], "threshold": [0.0, 0.0, 0.0],
            "value": [[0, 0], [1, 0], [0, 1]]}]}"#;
        match load_classifier_json(json) {
            Err(ClassifierError::Artifact(e)) => assert!(e.to_string().contains("feature 3"), "{e}"),
            other => panic!("expected artifact error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn plain_serde_cannot_build_an_invalid_forest() {
        let json = r#"{"kind": "forest", "n_features": 1, "trees": [{
            "children_left": [1, -1, -1], "children_right": [2, -1, -1],
            "feature": [5, -2, -2], "threshold": [0.0, -2.0, -2.0],
            "value": [[0, 0], [1, 0], [0, 1]]}]}"#;
        assert!(serde_json::from_str::<ClassifierArtifact>(json).is_err());
    }
}
