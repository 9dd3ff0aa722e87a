//! Derived feature vector fed to the classifier.

use crate::record::LoanType;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Column names of the feature matrix, in column order.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "income",
    "credit_score",
    "employment_status",
    "loan_type",
    "income_to_loan_ratio",
];

pub const N_FEATURES: usize = 5;

/// Matrix columns that are standardized: income, credit_score, income_to_loan_ratio.
pub const SCALED_COLUMNS: [usize; 3] = [0, 1, 4];

/// One row of the feature matrix.
///
/// Numeric fields hold *scaled* values; the two `*_encoded` fields hold
/// category indices from the fitted encoders.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatureSet {
    pub income: f64,
    pub credit_score: f64,
    pub employment_status_encoded: f64,
    pub loan_type_encoded: f64,
    pub income_to_loan_ratio: f64,
}

impl DerivedFeatureSet {
    /// Values in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [f64; N_FEATURES] {
        [
            self.income,
            self.credit_score,
            self.employment_status_encoded,
            self.loan_type_encoded,
            self.income_to_loan_ratio,
        ]
    }
}

/// Applicant income divided by the typical principal of the requested product.
///
/// Always computed from the raw income, before any scaling.
pub fn income_to_loan_ratio(income: f64, loan_type: LoanType) -> f64 {
    income / loan_type.typical_loan_amount()
}

/// Stack feature sets into an `(n, N_FEATURES)` matrix.
pub fn to_matrix(features: &[DerivedFeatureSet]) -> Array2<f64> {
    Array2::from_shape_fn((features.len(), N_FEATURES), |(i, j)| {
        features[i].to_array()[j]
    })
}
