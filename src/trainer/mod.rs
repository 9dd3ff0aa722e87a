//! Training run orchestration.
//!
//! A run generates (or receives) a labeled corpus, fits the preprocessor on
//! it, trains the forest on the training partition and scores the holdout.
//! The result is a [`TrainedPipeline`] ready to be saved as one artifact.

use crate::artifact::ArtifactMetadata;
use crate::config::TrainingConfig;
use crate::dataset::{GeneratorConfig, LabeledDataset, PolicyGenerator};
use crate::error::{EligibilityError, Result};
use crate::evaluation::EvaluationReport;
use crate::model::{ForestConfig, InferenceModel, RandomForest, TrainableModel};
use crate::pipeline::TrainedPipeline;
use crate::preprocessing::{FeaturePreprocessor, Transformer};
use crate::record::Eligibility;
use ndarray::Axis;
use tracing::{info, warn};

/// Runs training with a fixed, validated configuration.
///
/// Built via [`Trainer::builder`]; immutable afterwards and reusable across
/// corpora.
#[derive(Clone, Debug)]
pub struct Trainer {
    config: TrainingConfig,
}

/// Fluent builder for a [`Trainer`].
///
/// Starts from the given [`TrainingConfig`]; each setter overrides one field.
#[derive(Clone, Debug)]
pub struct TrainerBuilder {
    config: TrainingConfig,
}

impl TrainerBuilder {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn samples(mut self, samples: usize) -> Self {
        self.config.samples = samples;
        self
    }

    /// Sets the corpus, split and forest seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config = self.config.with_seed(seed);
        self
    }

    pub fn holdout_fraction(mut self, fraction: f64) -> Self {
        self.config.holdout_fraction = fraction;
        self
    }

    pub fn min_training_samples(mut self, n: usize) -> Self {
        self.config.min_training_samples = n;
        self
    }

    pub fn forest(mut self, forest: ForestConfig) -> Self {
        self.config.forest = forest;
        self
    }

    pub fn generator(mut self, generator: GeneratorConfig) -> Self {
        self.config.generator = generator;
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<Trainer> {
        self.config.validate()?;
        Ok(Trainer {
            config: self.config,
        })
    }
}

impl Trainer {
    /// Convenience constructor that starts the builder pattern.
    pub fn builder(config: TrainingConfig) -> TrainerBuilder {
        TrainerBuilder::new(config)
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Generate the synthetic corpus described by the config.
    pub fn generate_corpus(&self) -> Result<LabeledDataset> {
        let rows = PolicyGenerator::new(self.config.generator.clone())
            .generate(self.config.samples, self.config.seed)?;
        let dataset = LabeledDataset::new(rows)?;
        let counts = dataset.class_counts();
        info!(
            rows = dataset.len(),
            eligible = counts.eligible,
            not_eligible = counts.not_eligible,
            "Corpus generated"
        );
        Ok(dataset)
    }

    /// Generate a corpus and train on it.
    pub fn run(&self) -> Result<TrainedPipeline> {
        let dataset = self.generate_corpus()?;
        self.fit(&dataset)
    }

    /// Train on an existing corpus.
    ///
    /// # Errors
    /// [`EligibilityError::InsufficientTrainingData`] when the corpus is
    /// smaller than `min_training_samples` or holds a single class, in either
    /// the full corpus or the training partition.
    pub fn fit(&self, dataset: &LabeledDataset) -> Result<TrainedPipeline> {
        let n = dataset.len();
        if n < self.config.min_training_samples {
            return Err(EligibilityError::InsufficientTrainingData(format!(
                "{} rows is below the minimum of {}",
                n, self.config.min_training_samples
            )));
        }
        let counts = dataset.class_counts();
        if counts.eligible == 0 || counts.not_eligible == 0 {
            return Err(EligibilityError::InsufficientTrainingData(format!(
                "corpus of {} rows has a single class",
                n
            )));
        }
        if counts.eligible_fraction() < 0.1 || counts.eligible_fraction() > 0.9 {
            warn!(
                eligible_fraction = counts.eligible_fraction(),
                "Corpus is heavily imbalanced"
            );
        }

        let applicants = dataset.applicants();
        let labels = dataset.labels();
        let fit_state = FeaturePreprocessor::new().fit(&applicants)?;
        let x = fit_state.to_matrix(&applicants)?;

        let (train_idx, holdout_idx) =
            dataset.split_indices(self.config.holdout_fraction, self.config.seed)?;
        let pick = |idx: &[usize]| -> Vec<Eligibility> { idx.iter().map(|&i| labels[i]).collect() };
        let x_train = x.select(Axis(0), &train_idx);
        let x_holdout = x.select(Axis(0), &holdout_idx);
        let y_train = pick(&train_idx);
        let y_holdout = pick(&holdout_idx);

        let forest = RandomForest::new(self.config.forest.clone()).fit(&x_train, &y_train)?;

        let predicted: Vec<Eligibility> = forest
            .predict_batch(&x_holdout)?
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        let report = EvaluationReport::new(&y_holdout, &predicted, counts, train_idx.len())?;
        info!(
            accuracy = report.accuracy,
            precision = report.precision,
            recall = report.recall,
            holdout = report.holdout_size,
            "Holdout evaluation"
        );

        let metadata = ArtifactMetadata::new(self.config.seed, n, Some(report));
        Ok(TrainedPipeline::new(fit_state, forest, metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LabeledRecord;

    fn small() -> TrainingConfig {
        TrainingConfig::default().with_samples(300).with_forest(
            ForestConfig::default()
                .with_n_estimators(8)
                .with_min_samples_split(10)
                .with_min_samples_leaf(4),
        )
    }

    #[test]
    fn test_trainer_builder_default_values() {
        let trainer = Trainer::builder(TrainingConfig::default()).build().unwrap();
        assert_eq!(trainer.config(), &TrainingConfig::default());
    }

    #[test]
    fn test_trainer_builder_chaining() {
        let trainer = Trainer::builder(TrainingConfig::default())
            .samples(1000)
            .seed(9)
            .holdout_fraction(0.25)
            .min_training_samples(100)
            .build()
            .unwrap();
        let c = trainer.config();
        assert_eq!(c.samples, 1000);
        assert_eq!(c.seed, 9);
        assert_eq!(c.forest.seed, 9);
        assert_eq!(c.holdout_fraction, 0.25);
        assert_eq!(c.min_training_samples, 100);
    }

    #[test]
    fn test_trainer_builder_rejects_invalid() {
        assert!(Trainer::builder(TrainingConfig::default())
            .holdout_fraction(0.0)
            .build()
            .is_err());
    }

    #[test]
    fn test_run_produces_report() {
        let pipeline = Trainer::builder(small()).build().unwrap().run().unwrap();
        let meta = pipeline.metadata();
        assert_eq!(meta.corpus_size, 300);
        assert_eq!(meta.seed, 42);
        let report = meta.evaluation.as_ref().unwrap();
        assert_eq!(report.holdout_size, 60);
        assert_eq!(report.train_size, 240);
        assert!(report.accuracy > 0.7);
    }

    #[test]
    fn test_run_is_deterministic() {
        let trainer = Trainer::builder(small()).build().unwrap();
        let a = trainer.run().unwrap();
        let b = trainer.run().unwrap();
        assert_eq!(a.forest(), b.forest());
        assert_eq!(a.fit_state(), b.fit_state());
    }

    #[test]
    fn test_single_class_corpus_rejected() {
        let trainer = Trainer::builder(small()).build().unwrap();
        let rows: Vec<LabeledRecord> = trainer
            .generate_corpus()
            .unwrap()
            .rows()
            .iter()
            .cloned()
            .map(|mut r| {
                r.eligibility = Eligibility::Eligible;
                r
            })
            .collect();
        let dataset = LabeledDataset::new(rows).unwrap();
        assert!(matches!(
            trainer.fit(&dataset),
            Err(EligibilityError::InsufficientTrainingData(_))
        ));
    }

    #[test]
    fn test_small_corpus_rejected() {
        let trainer = Trainer::builder(small()).build().unwrap();
        let rows = trainer.generate_corpus().unwrap().rows()[..20].to_vec();
        let dataset = LabeledDataset::new(rows).unwrap();
        assert!(matches!(
            trainer.fit(&dataset),
            Err(EligibilityError::InsufficientTrainingData(_))
        ));
    }
}
