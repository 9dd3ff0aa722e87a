//! Standard Scaler (Z-score normalization).
//!
//! Transforms features by removing the mean and scaling to unit variance.
//!
//! The standard score of a sample `x` is calculated as:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the mean of the training samples, and `s` is the population
//! standard deviation (ddof = 0). Constant columns get `s = 1`.
//!
//! # Example
//! ```ignore
//! use loan_eligibility::preprocessing::{StandardScaler, Transformer, FittedTransformer};
//!
//! let fitted = StandardScaler::new().fit(&data)?;
//! let scaled = fitted.transform(&data)?;
//! ```

use crate::error::{EligibilityError, Result};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Serializable parameters for a fitted StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerParams {
    /// Mean of each feature.
    pub mean: Vec<f64>,
    /// Standard deviation of each feature.
    pub std: Vec<f64>,
    /// Number of features seen during fit.
    pub n_features: usize,
}

/// StandardScaler transformer (unfitted).
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardScaler;

impl StandardScaler {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for StandardScaler {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Fitted = FittedStandardScaler;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted> {
        let (rows, cols) = data.dim();

        if rows == 0 {
            return Err(EligibilityError::EmptyData(
                "Cannot fit StandardScaler on empty data".to_string(),
            ));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(EligibilityError::InvalidInput(
                "StandardScaler expects finite values".to_string(),
            ));
        }

        let mean = data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(cols));
        // population std; constant columns would divide by zero
        let std = data
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s == 0.0 { 1.0 } else { s });

        Ok(FittedStandardScaler { mean, std })
    }
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedStandardScaler {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl FittedStandardScaler {
    /// Get the mean values for each feature.
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Get the standard deviation values for each feature.
    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }
}

impl FittedTransformer for FittedStandardScaler {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Params = StandardScalerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output> {
        let cols = data.ncols();
        if cols != self.mean.len() {
            return Err(EligibilityError::FeatureMismatch {
                expected: self.mean.len(),
                got: cols,
            });
        }
        Ok((data - &self.mean) / &self.std)
    }

    fn extract_params(&self) -> Self::Params {
        StandardScalerParams {
            mean: self.mean.to_vec(),
            std: self.std.to_vec(),
            n_features: self.mean.len(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        if params.mean.len() != params.n_features || params.std.len() != params.n_features {
            return Err(EligibilityError::FeatureMismatch {
                expected: params.n_features,
                got: params.mean.len().min(params.std.len()),
            });
        }
        if params.std.iter().any(|&s| !s.is_finite() || s == 0.0)
            || params.mean.iter().any(|m| !m.is_finite())
        {
            return Err(EligibilityError::InvalidInput(
                "scaler parameters must be finite with non-zero std".to_string(),
            ));
        }
        Ok(Self {
            mean: Array1::from(params.mean),
            std: Array1::from(params.std),
        })
    }
}
