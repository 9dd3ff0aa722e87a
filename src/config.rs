//! Training run configuration.
//!
//! Every field has a default, so a JSON file only needs the values it
//! changes:
//!
//! ```json
//! { "samples": 2000, "forest": { "n_estimators": 50 } }
//! ```

use crate::dataset::{holdout_size, GeneratorConfig, DEFAULT_SEED};
use crate::error::{EligibilityError, Result};
use crate::model::ForestConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SAMPLES: usize = 5000;
pub const DEFAULT_HOLDOUT_FRACTION: f64 = 0.2;
pub const DEFAULT_MIN_TRAINING_SAMPLES: usize = 50;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Size of the synthetic corpus.
    pub samples: usize,
    /// Seed for corpus generation and the holdout split.
    pub seed: u64,
    pub holdout_fraction: f64,
    /// Smallest corpus a training run accepts.
    pub min_training_samples: usize,
    pub forest: ForestConfig,
    pub generator: GeneratorConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            seed: DEFAULT_SEED,
            holdout_fraction: DEFAULT_HOLDOUT_FRACTION,
            min_training_samples: DEFAULT_MIN_TRAINING_SAMPLES,
            forest: ForestConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Load from a JSON file and validate.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            EligibilityError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            EligibilityError::Config(format!("cannot parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Sets the run seed and the forest seed together.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.forest.seed = seed;
        self
    }

    pub fn with_holdout_fraction(mut self, fraction: f64) -> Self {
        self.holdout_fraction = fraction;
        self
    }

    pub fn with_min_training_samples(mut self, n: usize) -> Self {
        self.min_training_samples = n;
        self
    }

    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }

    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_training_samples < 2 {
            return Err(EligibilityError::Config(
                "min_training_samples must be at least 2".to_string(),
            ));
        }
        if self.samples < self.min_training_samples {
            return Err(EligibilityError::Config(format!(
                "samples ({}) is below min_training_samples ({})",
                self.samples, self.min_training_samples
            )));
        }
        if !(self.holdout_fraction > 0.0 && self.holdout_fraction < 1.0) {
            return Err(EligibilityError::Config(format!(
                "holdout_fraction must be in (0, 1), got {}",
                self.holdout_fraction
            )));
        }
        let train_rows = self
            .samples
            .saturating_sub(holdout_size(self.samples, self.holdout_fraction));
        if train_rows < self.forest.min_samples_split {
            return Err(EligibilityError::Config(format!(
                "training partition of {} rows (samples {}, holdout_fraction {}) is below \
                 forest.min_samples_split ({})",
                train_rows, self.samples, self.holdout_fraction, self.forest.min_samples_split
            )));
        }
        self.forest.validate()?;
        self.generator.validate()
    }
}
