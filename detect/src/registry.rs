//! Process-wide classifier slot.
//!
//! Binaries load their classifier once at startup with [`install`] and
//! share it through [`installed`]. The slot is write-once; reads after
//! initialization take no lock.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;

use crate::classifier::Classifier;
use crate::error::ClassifierError;

static CLASSIFIER: OnceCell<Arc<dyn Classifier>> = OnceCell::new();

/// Installs the process classifier. Fails if one is already installed.
pub fn install(classifier: Arc<dyn Classifier>) -> Result<Arc<dyn Classifier>, ClassifierError> {
    let features = classifier.num_features();
    CLASSIFIER
        .set(classifier)
        .map_err(|_| ClassifierError::AlreadyInstalled)?;
    info!(features, "classifier installed");
    installed()
}

/// Returns the installed classifier.
pub fn installed() -> Result<Arc<dyn Classifier>, ClassifierError> {
    CLASSIFIER.get().cloned().ok_or(ClassifierError::NotLoaded)
}

pub fn is_installed() -> bool {
    CLASSIFIER.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logistic::LogisticClassifier;

    // The slot is process-global, so the whole lifecycle lives in one test.
    #[test]
    fn install_once() {
        assert!(!is_installed());
        assert!(matches!(installed(), Err(ClassifierError::NotLoaded)));

        let first = Arc::new(LogisticClassifier::new(vec![1.0; 3], 0.0).unwrap());
        let handle = install(first).unwrap();
        assert_eq!(handle.num_features(), 3);
        assert!(is_installed());

        let second = Arc::new(LogisticClassifier::new(vec![1.0; 5], 0.0).unwrap());
        assert!(matches!(install(second), Err(ClassifierError::AlreadyInstalled)));
        assert_eq!(installed().unwrap().num_features(), 3);
    }
}
