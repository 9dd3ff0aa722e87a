//! Bagged random forest for the eligibility label.
//!
//! This module implements a type-safe ensemble with compile-time state tracking:
//! - `RandomForest<Unfitted>` carries only the configuration and can be fitted.
//! - `RandomForest<Fitted>` holds the grown trees and can predict or be exported.
//!
//! Each tree is grown on its own bootstrap sample with its own RNG stream
//! (`seed + tree index`), so a forest is fully determined by its config and
//! training data.

use crate::error::{EligibilityError, Result};
use crate::model::tree::{DecisionTree, TreeConfig};
use crate::model::{Fitted, InferenceModel, TrainableModel, Unfitted};
use crate::preprocessing::{DerivedFeatureSet, N_FEATURES};
use crate::record::Eligibility;
use ndarray::{Array1, Array2, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tracing::{debug, info};

/// Probability of `Eligible` at or above which the model predicts `Eligible`.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Per-class sample weighting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassWeight {
    /// Every sample weighs 1.
    Uniform,
    /// `w_c = n_samples / (2 * n_c)`.
    #[default]
    Balanced,
}

/// Number of features examined at each split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxFeatures {
    #[default]
    Sqrt,
    All,
    Count(usize),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Count(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Forest hyperparameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub class_weight: ClassWeight,
    pub max_features: MaxFeatures,
    /// Draw a bootstrap sample per tree; otherwise every tree sees all rows.
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_depth: 8,
            min_samples_split: 50,
            min_samples_leaf: 20,
            class_weight: ClassWeight::Balanced,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_min_samples_split(mut self, n: usize) -> Self {
        self.min_samples_split = n;
        self
    }

    pub fn with_min_samples_leaf(mut self, n: usize) -> Self {
        self.min_samples_leaf = n;
        self
    }

    pub fn with_class_weight(mut self, weight: ClassWeight) -> Self {
        self.class_weight = weight;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let problem = if self.n_estimators == 0 {
            Some("n_estimators must be at least 1")
        } else if self.max_depth == 0 {
            Some("max_depth must be at least 1")
        } else if self.min_samples_split < 2 {
            Some("min_samples_split must be at least 2")
        } else if self.min_samples_leaf == 0 {
            Some("min_samples_leaf must be at least 1")
        } else if self.max_features == MaxFeatures::Count(0) {
            Some("max_features must be at least 1")
        } else {
            None
        };
        match problem {
            Some(msg) => Err(EligibilityError::Config(msg.to_string())),
            None => Ok(()),
        }
    }

    fn tree_config(&self, n_features: usize) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features.resolve(n_features),
        }
    }
}

/// Serializable parameters of a fitted forest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub config: ForestConfig,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

/// Random forest classifier.
///
/// - When `S = Unfitted`: implements [`TrainableModel`].
/// - When `S = Fitted`: implements [`InferenceModel`].
#[derive(Clone, Debug, PartialEq)]
pub struct RandomForest<S> {
    config: ForestConfig,
    n_features: usize,
    trees: Vec<DecisionTree>,
    _state: PhantomData<S>,
}

impl RandomForest<Unfitted> {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            n_features: 0,
            trees: Vec::new(),
            _state: PhantomData,
        }
    }
}

impl<S> RandomForest<S> {
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

fn class_weights(labels: &[usize], mode: ClassWeight) -> [f64; 2] {
    match mode {
        ClassWeight::Uniform => [1.0, 1.0],
        ClassWeight::Balanced => {
            let n = labels.len() as f64;
            let n1 = labels.iter().filter(|&&y| y == 1).count() as f64;
            let n0 = n - n1;
            [n / (2.0 * n0), n / (2.0 * n1)]
        }
    }
}

impl TrainableModel for RandomForest<Unfitted> {
    type Input = Array2<f64>;
    type Target = [Eligibility];
    type Output = RandomForest<Fitted>;

    /// Grow the ensemble.
    ///
    /// # Errors
    /// - [`EligibilityError::InsufficientTrainingData`] when there are fewer
    ///   rows than `min_samples_split` or only one class is present.
    /// - [`EligibilityError::InvalidInput`] for mismatched lengths or
    ///   non-finite features.
    fn fit(&self, x: &Array2<f64>, target: &[Eligibility]) -> Result<RandomForest<Fitted>> {
        self.config.validate()?;
        let (n, n_features) = x.dim();
        if n != target.len() {
            return Err(EligibilityError::InvalidInput(format!(
                "{} feature rows but {} labels",
                n,
                target.len()
            )));
        }
        if n_features == 0 || x.iter().any(|v| !v.is_finite()) {
            return Err(EligibilityError::InvalidInput(
                "feature matrix must be non-empty and finite".to_string(),
            ));
        }
        if n < self.config.min_samples_split {
            return Err(EligibilityError::InsufficientTrainingData(format!(
                "{} rows is below the minimum of {}",
                n, self.config.min_samples_split
            )));
        }

        let y: Vec<usize> = target.iter().map(|l| l.index()).collect();
        let positives = y.iter().filter(|&&c| c == 1).count();
        if positives == 0 || positives == n {
            return Err(EligibilityError::InsufficientTrainingData(format!(
                "all {} rows carry the same label",
                n
            )));
        }

        let cw = class_weights(&y, self.config.class_weight);
        let weights: Vec<f64> = y.iter().map(|&c| cw[c]).collect();
        let tree_config = self.config.tree_config(n_features);
        debug!(?cw, max_features = tree_config.max_features, "Growing forest");

        let trees: Vec<DecisionTree> = (0..self.config.n_estimators)
            .map(|t| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(t as u64));
                let samples: Vec<usize> = if self.config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                DecisionTree::fit(x, &y, &weights, &samples, tree_config, &mut rng)
            })
            .collect();

        let deepest = trees.iter().map(DecisionTree::depth).max().unwrap_or(0);
        info!(
            trees = trees.len(),
            rows = n,
            eligible = positives,
            max_depth = deepest,
            "Forest trained"
        );

        Ok(RandomForest {
            config: self.config.clone(),
            n_features,
            trees,
            _state: PhantomData,
        })
    }
}

impl RandomForest<Fitted> {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean over trees of the leaf probability of `Eligible`.
    pub fn predict_proba_row(&self, row: ArrayView1<'_, f64>) -> Result<f64> {
        if row.len() != self.n_features {
            return Err(EligibilityError::FeatureMismatch {
                expected: self.n_features,
                got: row.len(),
            });
        }
        let sum: f64 = self
            .trees
            .iter()
            .map(|t| t.predict_proba(row)[Eligibility::Eligible.index()])
            .sum();
        Ok((sum / self.trees.len() as f64).clamp(0.0, 1.0))
    }

    /// Probability of `Eligible` for each row.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        x.outer_iter()
            .map(|row| self.predict_proba_row(row))
            .collect::<Result<Vec<_>>>()
            .map(Array1::from)
    }
}

fn label_for(probability: f64) -> Eligibility {
    if probability >= DECISION_THRESHOLD {
        Eligibility::Eligible
    } else {
        Eligibility::NotEligible
    }
}

impl InferenceModel for RandomForest<Fitted> {
    type InputSingle = DerivedFeatureSet;
    /// Predicted label and probability of `Eligible`.
    type OutputSingle = (Eligibility, f64);
    type InputBatch = Array2<f64>;
    type OutputBatch = Vec<(Eligibility, f64)>;
    type ParamsRepr = ForestParams;

    fn predict(&self, features: &DerivedFeatureSet) -> Result<(Eligibility, f64)> {
        let row = Array1::from(features.to_array().to_vec());
        let p = self.predict_proba_row(row.view())?;
        Ok((label_for(p), p))
    }

    fn predict_batch(&self, x: &Array2<f64>) -> Result<Vec<(Eligibility, f64)>> {
        Ok(self
            .predict_proba(x)?
            .iter()
            .map(|&p| (label_for(p), p))
            .collect())
    }

    fn extract_params(&self) -> ForestParams {
        ForestParams {
            config: self.config.clone(),
            n_features: self.n_features,
            trees: self.trees.clone(),
        }
    }

    fn from_params(params: ForestParams) -> Result<Self> {
        if params.n_features != N_FEATURES {
            return Err(EligibilityError::FeatureMismatch {
                expected: N_FEATURES,
                got: params.n_features,
            });
        }
        if params.trees.is_empty() {
            return Err(EligibilityError::InvalidInput(
                "forest has no trees".to_string(),
            ));
        }
        for tree in &params.trees {
            tree.validate(params.n_features)?;
        }
        Ok(Self {
            config: params.config,
            n_features: params.n_features,
            trees: params.trees,
            _state: PhantomData,
        })
    }
}
