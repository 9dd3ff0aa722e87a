//! Core traits for preprocessing transformers.
//!
//! This module defines the two central traits:
//! - [`Transformer`]: Used during fitting; has hyperparameters and can learn from data.
//! - [`FittedTransformer`]: After fitting; read-only, ready for inference and serialization.
//!
//! Fitting never mutates the unfitted transformer. It returns a new fitted
//! value, and every later `transform` call goes through that value, so there
//! is no way to transform with a transformer that was never fitted.

use crate::error::Result;
use crate::serialization::SerializableParams;

/// Trait for unfitted transformers with hyperparameters.
///
/// # Associated Types
/// - `Input`: Input data type (a feature matrix or a column of category labels).
/// - `Output`: Output data type after transformation.
/// - `Fitted`: The corresponding fitted transformer type.
///
/// # Example
/// ```ignore
/// use loan_eligibility::preprocessing::{Transformer, StandardScaler};
///
/// let scaler = StandardScaler::new();
/// let fitted = scaler.fit(&data)?;
/// let transformed = fitted.transform(&new_data)?;
/// ```
pub trait Transformer: Clone {
    /// Input data type for transformation.
    type Input: ?Sized;
    /// Output data type after transformation.
    type Output;
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer<Input = Self::Input, Output = Self::Output>;

    /// Learn parameters from the training data.
    ///
    /// # Errors
    /// Returns an error if the data is empty or contains values the
    /// transformer cannot learn from (NaN, Inf).
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted>;

    /// Fit the transformer and transform the same data.
    ///
    /// Equivalent to `fit` followed by `transform`, so the returned output is
    /// exactly what the returned fitted transformer produces for `data`.
    fn fit_transform(&self, data: &Self::Input) -> Result<(Self::Output, Self::Fitted)> {
        let fitted = self.fit(data)?;
        let output = fitted.transform(data)?;
        Ok((output, fitted))
    }
}

/// Trait for fitted transformers ready for inference.
///
/// # Guarantees
/// - `transform` is pure: it never changes the learned parameters.
/// - `extract_params()` + `from_params()` reproduces identical `transform` output.
pub trait FittedTransformer: Clone {
    /// Input data type for transformation.
    type Input: ?Sized;
    /// Output data type after transformation.
    type Output;
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;

    /// Transform data using learned parameters.
    fn transform(&self, data: &Self::Input) -> Result<Self::Output>;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Reconstruct a fitted transformer from parameters.
    ///
    /// Implementations re-validate the parameters; they may come from disk.
    fn from_params(params: Self::Params) -> Result<Self>
    where
        Self: Sized;
}
