//! Labeled training data: synthesis, splitting and CSV interchange.
//!
//! # Core Concepts
//!
//! - **Policy**: the ground-truth labeling rule ([`policy::label_applicant`]).
//! - **Generator**: seeded sampler that draws applicants and labels them
//!   ([`PolicyGenerator`]).
//! - **Dataset**: an owned, ordered corpus of [`LabeledRecord`]s with a
//!   deterministic holdout split.
//!
//! # Example
//!
//! ```rust
//! use loan_eligibility::dataset::{generate, LabeledDataset};
//!
//! let rows = generate(200, 42).unwrap();
//! let dataset = LabeledDataset::new(rows).unwrap();
//! let (train, holdout) = dataset.split(0.2, 42).unwrap();
//! assert_eq!(train.len() + holdout.len(), 200);
//! ```

pub mod generator;
pub mod policy;

pub use generator::{generate, GeneratorConfig, LoanProduct, PolicyGenerator, DEFAULT_SEED};
pub use policy::{label_applicant, policy_score, LoanCriteria};

use crate::error::{EligibilityError, Result};
use crate::record::{ApplicantRecord, Eligibility, LabeledRecord};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of rows per class, indexed by [`Eligibility::index`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub not_eligible: usize,
    pub eligible: usize,
}

impl ClassCounts {
    pub fn from_labels(labels: &[Eligibility]) -> Self {
        let eligible = labels.iter().filter(|l| l.is_eligible()).count();
        Self {
            not_eligible: labels.len() - eligible,
            eligible,
        }
    }

    pub fn total(&self) -> usize {
        self.not_eligible + self.eligible
    }

    pub fn get(&self, label: Eligibility) -> usize {
        match label {
            Eligibility::NotEligible => self.not_eligible,
            Eligibility::Eligible => self.eligible,
        }
    }

    /// Share of `Eligible` rows, or 0 for an empty count.
    pub fn eligible_fraction(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.eligible as f64 / self.total() as f64
        }
    }
}

/// An in-memory, non-empty labeled corpus.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledDataset {
    rows: Vec<LabeledRecord>,
}

/// Rows a `holdout_fraction` split of `n` rows sends to the holdout:
/// `ceil(n * holdout_fraction)`, with products within 1e-9 of an integer
/// taken as that integer.
pub fn holdout_size(n: usize, holdout_fraction: f64) -> usize {
    let raw = n as f64 * holdout_fraction;
    // 0.2 * 300 must give 60, not 61
    if (raw - raw.round()).abs() < 1e-9 {
        raw.round() as usize
    } else {
        raw.ceil() as usize
    }
}

impl LabeledDataset {
    /// Wraps rows after checking the corpus is non-empty and every record is in range.
    pub fn new(rows: Vec<LabeledRecord>) -> Result<Self> {
        if rows.is_empty() {
            return Err(EligibilityError::EmptyData("Dataset is empty".to_string()));
        }
        for row in &rows {
            row.applicant.validate()?;
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[LabeledRecord] {
        &self.rows
    }

    pub fn applicants(&self) -> Vec<ApplicantRecord> {
        self.rows.iter().map(|r| r.applicant.clone()).collect()
    }

    pub fn labels(&self) -> Vec<Eligibility> {
        self.rows.iter().map(|r| r.eligibility).collect()
    }

    pub fn class_counts(&self) -> ClassCounts {
        ClassCounts::from_labels(&self.labels())
    }

    /// Shuffled index split into `(train, holdout)`.
    ///
    /// The holdout receives `ceil(len * holdout_fraction)` rows; both sides are
    /// guaranteed non-empty. The permutation depends only on `seed`.
    pub fn split_indices(
        &self,
        holdout_fraction: f64,
        seed: u64,
    ) -> Result<(Vec<usize>, Vec<usize>)> {
        if !(holdout_fraction > 0.0 && holdout_fraction < 1.0) {
            return Err(EligibilityError::Config(format!(
                "holdout fraction must be in (0, 1), got {}",
                holdout_fraction
            )));
        }
        let n = self.len();
        let n_holdout = holdout_size(n, holdout_fraction);
        if n_holdout == 0 || n_holdout >= n {
            return Err(EligibilityError::InsufficientTrainingData(format!(
                "cannot split {} rows with holdout fraction {}",
                n, holdout_fraction
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
        let train = indices.split_off(n_holdout);
        Ok((train, indices))
    }

    /// Splits into `(train, holdout)` datasets. See [`Self::split_indices`].
    pub fn split(&self, holdout_fraction: f64, seed: u64) -> Result<(Self, Self)> {
        let (train_idx, holdout_idx) = self.split_indices(holdout_fraction, seed)?;
        let pick = |idx: &[usize]| Self {
            rows: idx.iter().map(|&i| self.rows[i].clone()).collect(),
        };
        Ok((pick(&train_idx), pick(&holdout_idx)))
    }

    /// Writes the corpus as CSV with a header row.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())
            .map_err(|e| EligibilityError::InvalidInput(format!("cannot open CSV: {}", e)))?;
        for row in &self.rows {
            writer
                .serialize(CsvRow::from(row))
                .map_err(|e| EligibilityError::InvalidInput(format!("CSV write failed: {}", e)))?;
        }
        writer
            .flush()
            .map_err(|e| EligibilityError::InvalidInput(format!("CSV flush failed: {}", e)))?;
        Ok(())
    }

    /// Reads a corpus previously written by [`Self::write_csv`].
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path.as_ref())
            .map_err(|e| EligibilityError::InvalidInput(format!("cannot open CSV: {}", e)))?;
        let mut rows = Vec::new();
        for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
            let raw = result.map_err(|e| {
                EligibilityError::InvalidInput(format!("CSV row {}: {}", line + 1, e))
            })?;
            rows.push(raw.try_into()?);
        }
        Self::new(rows)
    }
}

/// Flat CSV shape using the human-readable category labels.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    income: f64,
    credit_score: u32,
    employment_status: String,
    loan_type: String,
    eligibility: String,
}

impl From<&LabeledRecord> for CsvRow {
    fn from(row: &LabeledRecord) -> Self {
        Self {
            income: row.applicant.income,
            credit_score: row.applicant.credit_score,
            employment_status: row.applicant.employment_status.label().to_string(),
            loan_type: row.applicant.loan_type.label().to_string(),
            eligibility: row.eligibility.label().to_string(),
        }
    }
}

impl TryFrom<CsvRow> for LabeledRecord {
    type Error = EligibilityError;

    fn try_from(raw: CsvRow) -> Result<Self> {
        let eligibility = Eligibility::CLASSES
            .into_iter()
            .find(|c| c.label() == raw.eligibility)
            .ok_or_else(|| {
                EligibilityError::InvalidInput(format!("unknown label '{}'", raw.eligibility))
            })?;
        Ok(LabeledRecord {
            applicant: ApplicantRecord::new(
                raw.income,
                raw.credit_score,
                raw.employment_status.parse()?,
                raw.loan_type.parse()?,
            )?,
            eligibility,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dataset_rejected() {
        assert!(matches!(
            LabeledDataset::new(vec![]),
            Err(EligibilityError::EmptyData(_))
        ));
    }

    #[test]
    fn test_split_sizes_and_disjointness() {
        let dataset = LabeledDataset::new(generate(101, DEFAULT_SEED).unwrap()).unwrap();
        let (train, holdout) = dataset.split_indices(0.2, 3).unwrap();
        assert_eq!(holdout.len(), 21);
        assert_eq!(train.len(), 80);

        let mut all: Vec<usize> = train.iter().chain(holdout.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..101).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_deterministic() {
        let dataset = LabeledDataset::new(generate(50, DEFAULT_SEED).unwrap()).unwrap();
        assert_eq!(
            dataset.split_indices(0.3, 9).unwrap(),
            dataset.split_indices(0.3, 9).unwrap()
        );
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        let dataset = LabeledDataset::new(generate(10, DEFAULT_SEED).unwrap()).unwrap();
        assert!(dataset.split(0.0, 1).is_err());
        assert!(dataset.split(1.0, 1).is_err());
    }

    #[test]
    fn test_class_counts() {
        let counts = ClassCounts::from_labels(&[
            Eligibility::Eligible,
            Eligibility::NotEligible,
            Eligibility::Eligible,
        ]);
        assert_eq!(counts.eligible, 2);
        assert_eq!(counts.not_eligible, 1);
        assert_eq!(counts.get(Eligibility::Eligible), 2);
        assert!((counts.eligible_fraction() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_csv_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.csv");
        let dataset = LabeledDataset::new(generate(25, DEFAULT_SEED).unwrap()).unwrap();
        dataset.write_csv(&path).unwrap();

        let loaded = LabeledDataset::read_csv(&path).unwrap();
        assert_eq!(loaded.len(), 25);
        assert_eq!(loaded.labels(), dataset.labels());
        assert_eq!(
            loaded.rows()[0].applicant.loan_type,
            dataset.rows()[0].applicant.loan_type
        );
    }
}
