//! Read-only inference facade over a saved artifact.
//!
//! A [`DecisionEngine`] is immutable once opened. It is `Send + Sync`, so one
//! engine behind an `Arc` can serve any number of threads without locking.

use crate::affordability::LoanTerms;
use crate::artifact::{self, ArtifactMetadata};
use crate::error::{EligibilityError, Result};
use crate::pipeline::{Decision, TrainedPipeline};
use crate::record::{ApplicantRecord, Eligibility};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct DecisionEngine {
    pipeline: TrainedPipeline,
    source: Option<PathBuf>,
}

impl DecisionEngine {
    /// Load the artifact at `path`.
    ///
    /// # Errors
    /// [`EligibilityError::ArtifactLoad`] if the file is missing or invalid.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(EligibilityError::ArtifactLoad(format!(
                "no artifact at {}; run training first",
                path.display()
            )));
        }
        Ok(Self {
            pipeline: TrainedPipeline::load(path)?,
            source: Some(path.to_path_buf()),
        })
    }

    /// Wrap an in-memory pipeline.
    pub fn from_pipeline(pipeline: TrainedPipeline) -> Self {
        Self {
            pipeline,
            source: None,
        }
    }

    /// Whether [`Self::open`] would succeed for `path`: framing and checksum
    /// verify, and the payload decodes into a valid pipeline.
    pub fn is_artifact_available<P: AsRef<Path>>(path: P) -> bool {
        artifact::load(path)
            .and_then(TrainedPipeline::from_payload)
            .is_ok()
    }

    /// Final label and model probability of `Eligible`.
    pub fn predict(&self, record: &ApplicantRecord) -> Result<(Eligibility, f64)> {
        let decision = self.pipeline.predict(record)?;
        Ok((decision.label, decision.probability))
    }

    /// Full decision, with an affordability estimate when `terms` are given.
    pub fn decide(&self, record: &ApplicantRecord, terms: Option<LoanTerms>) -> Result<Decision> {
        self.pipeline.predict_with_terms(record, terms.as_ref())
    }

    pub fn decide_batch(&self, records: &[ApplicantRecord]) -> Result<Vec<Decision>> {
        self.pipeline.predict_batch(records)
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        self.pipeline.metadata()
    }

    pub fn pipeline(&self) -> &TrainedPipeline {
        &self.pipeline
    }

    /// File the engine was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingConfig;
    use crate::model::ForestConfig;
    use crate::record::{EmploymentStatus, LoanType};
    use crate::trainer::Trainer;
    use std::sync::Arc;
    use std::thread;

    fn assert_send_sync<T: Send + Sync>() {}

    fn trained() -> TrainedPipeline {
        let config = TrainingConfig::default().with_samples(300).with_forest(
            ForestConfig::default()
                .with_n_estimators(6)
                .with_min_samples_split(10)
                .with_min_samples_leaf(4),
        );
        Trainer::builder(config).build().unwrap().run().unwrap()
    }

    #[test]
    fn test_engine_is_send_sync() {
        assert_send_sync::<DecisionEngine>();
    }

    #[test]
    fn test_open_missing_artifact_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.bin");
        assert!(!DecisionEngine::is_artifact_available(&path));
        assert!(matches!(
            DecisionEngine::open(&path),
            Err(EligibilityError::ArtifactLoad(_))
        ));
    }

    #[test]
    fn test_corrupt_file_is_not_available() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.bin");
        std::fs::write(&path, b"definitely not an artifact, just some bytes here").unwrap();
        assert!(!DecisionEngine::is_artifact_available(&path));
        assert!(DecisionEngine::open(&path).is_err());
    }

    #[test]
    fn test_checksummed_but_invalid_payload_is_not_available() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swapped.bin");
        let mut payload = trained().to_payload();
        payload.label_encoder.classes.reverse();
        // framing and checksum are valid, only the label order is wrong
        artifact::save(&path, &payload).unwrap();
        assert!(artifact::load(&path).is_ok());

        assert!(!DecisionEngine::is_artifact_available(&path));
        assert!(matches!(
            DecisionEngine::open(&path),
            Err(EligibilityError::ArtifactLoad(_))
        ));
    }

    #[test]
    fn test_open_saved_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        let pipeline = trained();
        pipeline.save(&path).unwrap();
        assert!(DecisionEngine::is_artifact_available(&path));

        let engine = DecisionEngine::open(&path).unwrap();
        assert_eq!(engine.source(), Some(path.as_path()));
        let r = ApplicantRecord::new(200_000.0, 820, EmploymentStatus::Employed, LoanType::Car)
            .unwrap();
        let (label, p) = engine.predict(&r).unwrap();
        assert_eq!(label, Eligibility::Eligible);
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_shared_across_threads() {
        let engine = Arc::new(DecisionEngine::from_pipeline(trained()));
        let r = ApplicantRecord::new(72_000.0, 690, EmploymentStatus::Employed, LoanType::Home)
            .unwrap();
        let expected = engine.predict(&r).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let r = r.clone();
                thread::spawn(move || engine.predict(&r).unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    }

    #[test]
    fn test_decide_attaches_affordability() {
        let engine = DecisionEngine::from_pipeline(trained());
        let r = ApplicantRecord::new(90_000.0, 720, EmploymentStatus::Employed, LoanType::Car)
            .unwrap();
        let terms = LoanTerms::new(30_000.0, 48).unwrap();
        let d = engine.decide(&r, Some(terms)).unwrap();
        let a = d.affordability.unwrap();
        assert!(a.monthly_payment > 0.0);
        assert!(!a.exceeds_dti_limit);
        assert_eq!(engine.decide(&r, None).unwrap().affordability, None);
    }
}
