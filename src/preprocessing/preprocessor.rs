//! Applicant-record preprocessor.
//!
//! [`FeaturePreprocessor`] is the unfitted side: it owns no learned state.
//! Fitting returns a [`FitState`], an immutable value that every later
//! `transform` goes through. Nothing here mutates a `FitState` after fit, so
//! one state can be shared by any number of readers.

use crate::error::{EligibilityError, Result};
use crate::preprocessing::encoding::{
    CategoricalEncoder, CategoricalEncoderParams, FittedCategoricalEncoder,
};
use crate::preprocessing::features::{income_to_loan_ratio, to_matrix, DerivedFeatureSet};
use crate::preprocessing::scaling::{FittedStandardScaler, StandardScaler, StandardScalerParams};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::record::ApplicantRecord;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

const EMPLOYMENT_COLUMN: &str = "employment_status";
const LOAN_TYPE_COLUMN: &str = "loan_type";
/// income, credit_score, income_to_loan_ratio
const N_NUMERIC: usize = 3;

/// Unfitted preprocessor.
#[derive(Clone, Debug, Default)]
pub struct FeaturePreprocessor {
    scaler: StandardScaler,
}

impl FeaturePreprocessor {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Learned encoders and scaler statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct FitState {
    employment: FittedCategoricalEncoder,
    loan_type: FittedCategoricalEncoder,
    scaler: FittedStandardScaler,
}

/// Serializable parameters for a [`FitState`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitStateParams {
    pub employment: CategoricalEncoderParams,
    pub loan_type: CategoricalEncoderParams,
    pub scaler: StandardScalerParams,
}

fn numeric_matrix(rows: &[ApplicantRecord]) -> Array2<f64> {
    Array2::from_shape_fn((rows.len(), N_NUMERIC), |(i, j)| {
        let r = &rows[i];
        match j {
            0 => r.income,
            1 => f64::from(r.credit_score),
            _ => income_to_loan_ratio(r.income, r.loan_type),
        }
    })
}

impl Transformer for FeaturePreprocessor {
    type Input = [ApplicantRecord];
    type Output = Vec<DerivedFeatureSet>;
    type Fitted = FitState;

    fn fit(&self, rows: &Self::Input) -> Result<FitState> {
        if rows.is_empty() {
            return Err(EligibilityError::EmptyData(
                "Cannot fit preprocessor on zero records".to_string(),
            ));
        }
        for row in rows {
            row.validate()?;
        }

        let employment: Vec<String> = rows
            .iter()
            .map(|r| r.employment_status.label().to_string())
            .collect();
        let loan_types: Vec<String> = rows
            .iter()
            .map(|r| r.loan_type.label().to_string())
            .collect();

        let state = FitState {
            employment: CategoricalEncoder::new(EMPLOYMENT_COLUMN).fit(&employment)?,
            loan_type: CategoricalEncoder::new(LOAN_TYPE_COLUMN).fit(&loan_types)?,
            scaler: self.scaler.fit(&numeric_matrix(rows))?,
        };
        debug!(
            rows = rows.len(),
            employment_categories = state.employment.categories().len(),
            loan_type_categories = state.loan_type.categories().len(),
            "Preprocessor fitted"
        );
        Ok(state)
    }
}

impl FitState {
    pub fn scaler(&self) -> &FittedStandardScaler {
        &self.scaler
    }

    pub fn transform_one(&self, record: &ApplicantRecord) -> Result<DerivedFeatureSet> {
        let mut rows = self.transform(std::slice::from_ref(record))?;
        rows.pop().ok_or_else(|| {
            EligibilityError::InvalidInput("transform produced no row".to_string())
        })
    }

    /// Transform straight into an `(n, 5)` classifier input matrix.
    pub fn to_matrix(&self, rows: &[ApplicantRecord]) -> Result<Array2<f64>> {
        Ok(to_matrix(&self.transform(rows)?))
    }
}

impl FittedTransformer for FitState {
    type Input = [ApplicantRecord];
    type Output = Vec<DerivedFeatureSet>;
    type Params = FitStateParams;

    fn transform(&self, rows: &Self::Input) -> Result<Self::Output> {
        let mut codes = Vec::with_capacity(rows.len());
        for row in rows {
            row.validate()?;
            codes.push((
                self.employment.encode(row.employment_status.label())?,
                self.loan_type.encode(row.loan_type.label())?,
            ));
        }
        let scaled = self.scaler.transform(&numeric_matrix(rows))?;

        Ok(codes
            .into_iter()
            .zip(scaled.outer_iter())
            .map(|((employment, loan_type), numeric)| DerivedFeatureSet {
                income: numeric[0],
                credit_score: numeric[1],
                employment_status_encoded: employment as f64,
                loan_type_encoded: loan_type as f64,
                income_to_loan_ratio: numeric[2],
            })
            .collect())
    }

    fn extract_params(&self) -> FitStateParams {
        FitStateParams {
            employment: self.employment.extract_params(),
            loan_type: self.loan_type.extract_params(),
            scaler: self.scaler.extract_params(),
        }
    }

    fn from_params(params: FitStateParams) -> Result<Self> {
        if params.scaler.n_features != N_NUMERIC {
            return Err(EligibilityError::FeatureMismatch {
                expected: N_NUMERIC,
                got: params.scaler.n_features,
            });
        }
        Ok(Self {
            employment: FittedCategoricalEncoder::from_params(params.employment)?,
            loan_type: FittedCategoricalEncoder::from_params(params.loan_type)?,
            scaler: FittedStandardScaler::from_params(params.scaler)?,
        })
    }
}

/// Fit a fresh preprocessor on `rows` and transform them.
pub fn fit_transform(rows: &[ApplicantRecord]) -> Result<(Vec<DerivedFeatureSet>, FitState)> {
    FeaturePreprocessor::new().fit_transform(rows)
}

/// Transform `rows` with an existing fit state.
pub fn transform(rows: &[ApplicantRecord], state: &FitState) -> Result<Vec<DerivedFeatureSet>> {
    state.transform(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{generate, DEFAULT_SEED};
    use crate::record::{EmploymentStatus, LoanType};

    fn record(income: f64, credit: u32, e: EmploymentStatus, l: LoanType) -> ApplicantRecord {
        ApplicantRecord::new(income, credit, e, l).unwrap()
    }

    fn corpus() -> Vec<ApplicantRecord> {
        generate(300, DEFAULT_SEED)
            .unwrap()
            .into_iter()
            .map(|r| r.applicant)
            .collect()
    }

    #[test]
    fn test_transform_reproduces_fit_transform_single_row() {
        let r = record(64_000.0, 702, EmploymentStatus::SelfEmployed, LoanType::Education);
        let (features, state) = fit_transform(std::slice::from_ref(&r)).unwrap();
        assert_eq!(transform(&[r], &state).unwrap(), features);
    }

    #[test]
    fn test_transform_reproduces_fit_transform_corpus() {
        let rows = corpus();
        let (features, state) = fit_transform(&rows).unwrap();
        assert_eq!(state.transform(&rows).unwrap(), features);
    }

    #[test]
    fn test_ratio_computed_from_raw_income() {
        let rows = vec![
            record(50_000.0, 700, EmploymentStatus::Employed, LoanType::Car),
            record(100_000.0, 700, EmploymentStatus::Employed, LoanType::Home),
        ];
        let state = FeaturePreprocessor::new().fit(&rows).unwrap();
        let raw_ratios = [50_000.0 / 35_000.0, 100_000.0 / 250_000.0];
        let mean = (raw_ratios[0] + raw_ratios[1]) / 2.0;
        assert!((state.scaler().mean()[2] - mean).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_loan_type_is_error() {
        let state = FeaturePreprocessor::new().fit(&corpus()).unwrap();
        let before = state.extract_params();
        let r = record(80_000.0, 720, EmploymentStatus::Employed, LoanType::Business);
        match state.transform_one(&r) {
            Err(EligibilityError::UnknownCategory { column, value }) => {
                assert_eq!(column, "loan_type");
                assert_eq!(value, "Business Loan");
            }
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
        assert_eq!(state.extract_params(), before);
    }

    #[test]
    fn test_transform_does_not_refit_scaler() {
        let rows = corpus();
        let state = FeaturePreprocessor::new().fit(&rows).unwrap();
        let outlier = record(499_000.0, 849, EmploymentStatus::Employed, LoanType::Car);
        let a = state.transform_one(&outlier).unwrap();
        let b = state.transform_one(&outlier).unwrap();
        assert_eq!(a, b);
        assert!(a.income > 3.0);
    }

    #[test]
    fn test_invalid_record_rejected() {
        let state = FeaturePreprocessor::new().fit(&corpus()).unwrap();
        let bad = ApplicantRecord {
            income: -1.0,
            credit_score: 700,
            employment_status: EmploymentStatus::Employed,
            loan_type: LoanType::Car,
        };
        assert!(matches!(
            state.transform_one(&bad),
            Err(EligibilityError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_params_round_trip_reproduces_transform() {
        let rows = corpus();
        let (features, state) = fit_transform(&rows).unwrap();
        let restored = FitState::from_params(state.extract_params()).unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.transform(&rows).unwrap(), features);
    }

    #[test]
    fn test_empty_fit_rejected() {
        assert!(matches!(
            FeaturePreprocessor::new().fit(&[]),
            Err(EligibilityError::EmptyData(_))
        ));
    }
}
