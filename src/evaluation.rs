//! Holdout metrics for a trained classifier.

use crate::dataset::ClassCounts;
use crate::error::{EligibilityError, Result};
use crate::record::Eligibility;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary confusion matrix with `Eligible` as the positive class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(actual: &[Eligibility], predicted: &[Eligibility]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(EligibilityError::InvalidInput(format!(
                "{} labels but {} predictions",
                actual.len(),
                predicted.len()
            )));
        }
        let mut m = Self::default();
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a, p) {
                (Eligibility::NotEligible, Eligibility::NotEligible) => m.true_negative += 1,
                (Eligibility::NotEligible, Eligibility::Eligible) => m.false_positive += 1,
                (Eligibility::Eligible, Eligibility::NotEligible) => m.false_negative += 1,
                (Eligibility::Eligible, Eligibility::Eligible) => m.true_positive += 1,
            }
        }
        Ok(m)
    }

    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

/// `num / den`, or 0 when `den` is 0.
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Metrics recorded for one training run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion: ConfusionMatrix,
    /// Class distribution of the full labeled corpus.
    pub corpus_classes: ClassCounts,
    pub train_size: usize,
    pub holdout_size: usize,
}

impl EvaluationReport {
    pub fn new(
        actual: &[Eligibility],
        predicted: &[Eligibility],
        corpus_classes: ClassCounts,
        train_size: usize,
    ) -> Result<Self> {
        let confusion = ConfusionMatrix::from_predictions(actual, predicted)?;
        Ok(Self {
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1: confusion.f1(),
            confusion,
            corpus_classes,
            train_size,
            holdout_size: actual.len(),
        })
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "accuracy {:.4}  precision {:.4}  recall {:.4}  f1 {:.4}",
            self.accuracy, self.precision, self.recall, self.f1
        )?;
        writeln!(
            f,
            "confusion (tn fp / fn tp): {} {} / {} {}",
            self.confusion.true_negative,
            self.confusion.false_positive,
            self.confusion.false_negative,
            self.confusion.true_positive
        )?;
        write!(
            f,
            "corpus: {} eligible / {} not eligible; train {} holdout {}",
            self.corpus_classes.eligible,
            self.corpus_classes.not_eligible,
            self.train_size,
            self.holdout_size
        )
    }
}
