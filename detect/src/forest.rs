//! Random-forest classifier over flat-array decision trees.
//!
//! Each tree stores one entry per node in parallel arrays. Node 0 is the
//! root; a node is a leaf when `children_left[node] == -1`. Split nodes send
//! a sample left when `x[feature] <= threshold`. Leaves hold per-class
//! weights (sample counts or fractions) that are normalized before voting.

use serde::{Deserialize, Serialize};

use crate::classifier::{check_dimension, ClassProbabilities, Classifier};
use crate::error::ClassifierError;

/// Marks a missing child.
pub const LEAF: i64 = -1;

/// One binary decision tree in flat-array form.
///
/// Deserialization checks the node structure; feature indices are checked
/// against the model width by [`ForestClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TreeArrays")]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights `[human, ai_generated]`.
    pub value: Vec<[f64; 2]>,
}

impl DecisionTree {
    /// A single-split tree: `x[feature] <= threshold` picks `left`, otherwise `right`.
    pub fn stump(feature: usize, threshold: f64, left: [f64; 2], right: [f64; 2]) -> Self {
        Self {
            children_left: vec![1, LEAF, LEAF],
            children_right: vec![2, LEAF, LEAF],
            feature: vec![feature as i64, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![[0.0, 0.0], left, right],
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, num_features: usize) -> Result<(), ClassifierError> {
        self.validate_structure()?;
        for node in 0..self.num_nodes() {
            if self.children_left[node] == LEAF {
                continue;
            }
            let feature = self.feature[node];
            if feature as usize >= num_features {
                return Err(ClassifierError::InvalidModel(format!(
                    "node {node} splits on feature {feature}, model has {num_features}"
                )));
            }
        }
        Ok(())
    }

    /// Checks everything that does not depend on the model width.
    fn validate_structure(&self) -> Result<(), ClassifierError> {
        let n = self.num_nodes();
        if n == 0 {
            return Err(ClassifierError::InvalidModel("tree has no nodes".into()));
        }
        let lengths = [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(ClassifierError::InvalidModel(format!(
                "node arrays disagree in length: {n} vs {lengths:?}"
            )));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                let weights = self.value[node];
                let total = weights[0] + weights[1];
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || total <= 0.0 {
                    return Err(ClassifierError::InvalidModel(format!(
                        "leaf {node} has invalid class weights {weights:?}"
                    )));
                }
                continue;
            }
            // Children always come after their parent, so traversal terminates.
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(ClassifierError::InvalidModel(format!(
                        "node {node} has out-of-order child {child}"
                    )));
                }
            }
            let feature = self.feature[node];
            if feature < 0 {
                return Err(ClassifierError::InvalidModel(format!(
                    "node {node} splits on negative feature {feature}"
                )));
            }
            if self.threshold[node].is_nan() {
                return Err(ClassifierError::InvalidModel(format!(
                    "node {node} has NaN threshold"
                )));
            }
        }
        Ok(())
    }

    /// Normalized class distribution of the leaf `features` lands in.
    fn leaf_distribution(&self, features: &[f32]) -> [f64; 2] {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let x = features[self.feature[node] as usize] as f64;
            node = if x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        let [h, a] = self.value[node];
        let total = h + a;
        [h / total, a / total]
    }
}

#[derive(Deserialize)]
struct TreeArrays {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<[f64; 2]>,
}

impl TryFrom<TreeArrays> for DecisionTree {
    type Error = ClassifierError;

    fn try_from(raw: TreeArrays) -> Result<Self, Self::Error> {
        let tree = Self {
            children_left: raw.children_left,
            children_right: raw.children_right,
            feature: raw.feature,
            threshold: raw.threshold,
            value: raw.value,
        };
        tree.validate_structure()?;
        Ok(tree)
    }
}

/// Soft-voting ensemble of [`DecisionTree`]s.
///
/// Every instance is validated, including deserialized ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ForestParts")]
pub struct ForestClassifier {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

#[derive(Deserialize)]
struct ForestParts {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl TryFrom<ForestParts> for ForestClassifier {
    type Error = ClassifierError;

    fn try_from(raw: ForestParts) -> Result<Self, Self::Error> {
        Self::new(raw.n_features, raw.trees)
    }
}

impl ForestClassifier {
    pub fn new(n_features: usize, trees: Vec<DecisionTree>) -> Result<Self, ClassifierError> {
        let forest = Self { n_features, trees };
        forest.validate()?;
        Ok(forest)
    }

    fn validate(&self) -> Result<(), ClassifierError> {
        if self.n_features == 0 {
            return Err(ClassifierError::InvalidModel("n_features must be positive".into()));
        }
        if self.trees.is_empty() {
            return Err(ClassifierError::InvalidModel("forest has no trees".into()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features).map_err(|e| match e {
                ClassifierError::InvalidModel(msg) => {
                    ClassifierError::InvalidModel(format!("tree {i}: {msg}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

impl Classifier for ForestClassifier {
    fn num_features(&self) -> usize {
        self.n_features
    }

    fn predict_probabilities(&self, features: &[f32]) -> Result<ClassProbabilities, ClassifierError> {
        check_dimension(self.n_features, features)?;
        let mut sum = [0.0f64; 2];
        for tree in &self.trees {
            let [h, a] = tree.leaf_distribution(features);
            sum[0] += h;
            sum[1] += a;
        }
        let n = self.trees.len() as f64;
        ClassProbabilities::new(sum[0] / n, sum[1] / n)
    }
}
