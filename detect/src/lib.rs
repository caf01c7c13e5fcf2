//! Human vs. synthetic speech detection.
//!
//! # Architecture
//!
//! A [`Detector`] runs three stages, stopping at the first failure:
//!
//! 1. [`voxguard_audio::Normalizer`]: encoded bytes -> 16 kHz mono fixed-length waveform
//! 2. [`voxguard_features::Extractor`]: waveform -> 86-element feature vector
//! 3. [`classify`]: feature vector -> [`ClassProbabilities`] via a [`Classifier`]
//!
//! The winning class becomes a [`PredictionResult`] with its probability as
//! confidence. Any stage failure becomes a result labelled `ERROR` with
//! confidence 0; [`Detector::try_predict`] exposes the typed [`PredictError`]
//! instead.
//!
//! # Classifiers
//!
//! [`Classifier`] is the seam for trained models. [`ForestClassifier`] and
//! [`LogisticClassifier`] load from JSON artifacts with
//! [`load_classifier_json`]. A process can keep one classifier in the
//! write-once [`registry`].

mod adapter;
mod artifact;
mod classifier;
mod config;
mod error;
mod forest;
mod logistic;
mod pipeline;
mod prediction;
pub mod registry;

pub use adapter::classify;
pub use artifact::{load_classifier_json, ClassifierArtifact};
pub use classifier::{ClassLabel, ClassProbabilities, Classifier};
pub use config::{check_lockstep, PipelineConfig};
pub use error::{ClassifierError, ConfigError, FailureKind, PredictError, Stage};
pub use forest::{DecisionTree, ForestClassifier, LEAF};
pub use logistic::LogisticClassifier;
pub use pipeline::{Detection, Detector};
pub use prediction::{Label, PredictionResult};
