//! Ordinal encoding for string-valued categorical columns.
//!
//! Maps each distinct category label to an integer index (0, 1, 2, ...).
//! Categories are sorted before indices are assigned, so the mapping depends
//! only on the set of labels seen during fit, not on row order.

use crate::error::{EligibilityError, Result};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Ordinal encoder for one categorical column (unfitted).
///
/// # Example
/// ```ignore
/// let encoder = CategoricalEncoder::new("loan_type");
/// let fitted = encoder.fit(&["Home Loan".to_string(), "Car Loan".to_string()])?;
/// assert_eq!(fitted.encode("Car Loan")?, 0);
/// assert!(fitted.encode("Boat Loan").is_err());
/// ```
#[derive(Clone, Debug)]
pub struct CategoricalEncoder {
    column: String,
}

impl CategoricalEncoder {
    /// Create an encoder for the named column. The name is only used in errors.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

/// Serializable parameters for a fitted CategoricalEncoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoricalEncoderParams {
    pub column: String,
    /// Categories in index order.
    pub categories: Vec<String>,
}

/// Fitted CategoricalEncoder ready for inference.
#[derive(Clone, Debug)]
pub struct FittedCategoricalEncoder {
    column: String,
    categories: Vec<String>,
    index: HashMap<String, usize>,
}

impl FittedCategoricalEncoder {
    /// Categories in index order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Encode one label.
    ///
    /// # Errors
    /// [`EligibilityError::UnknownCategory`] for a label not seen during fit.
    pub fn encode(&self, value: &str) -> Result<usize> {
        self.index
            .get(value)
            .copied()
            .ok_or_else(|| EligibilityError::unknown_category(&self.column, value))
    }

    fn build(column: String, categories: Vec<String>) -> Self {
        let index = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            column,
            categories,
            index,
        }
    }
}

impl PartialEq for FittedCategoricalEncoder {
    fn eq(&self, other: &Self) -> bool {
        self.column == other.column && self.categories == other.categories
    }
}

impl Transformer for CategoricalEncoder {
    type Input = [String];
    type Output = Vec<usize>;
    type Fitted = FittedCategoricalEncoder;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted> {
        if data.is_empty() {
            return Err(EligibilityError::EmptyData(format!(
                "Cannot fit CategoricalEncoder for '{}' on empty data",
                self.column
            )));
        }
        let categories: Vec<String> = data
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Ok(FittedCategoricalEncoder::build(self.column.clone(), categories))
    }
}

impl FittedTransformer for FittedCategoricalEncoder {
    type Input = [String];
    type Output = Vec<usize>;
    type Params = CategoricalEncoderParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output> {
        data.iter().map(|v| self.encode(v)).collect()
    }

    fn extract_params(&self) -> Self::Params {
        CategoricalEncoderParams {
            column: self.column.clone(),
            categories: self.categories.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        let distinct: BTreeSet<&String> = params.categories.iter().collect();
        if params.categories.is_empty() || distinct.len() != params.categories.len() {
            return Err(EligibilityError::InvalidInput(format!(
                "encoder for '{}' needs a non-empty list of distinct categories",
                params.column
            )));
        }
        Ok(Self::build(params.column, params.categories))
    }
}
