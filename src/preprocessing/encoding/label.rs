//! Target label encoding.
//!
//! Unlike the categorical encoders, the target encoder is never learned from
//! data: its class order is fixed by [`Eligibility`], regardless of label
//! frequency in the corpus. It is still persisted with the artifact so a load
//! can prove the stored model was trained against the same order.

use crate::error::{EligibilityError, Result};
use crate::record::Eligibility;
use serde::{Deserialize, Serialize};

/// Serializable parameters for the label encoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoderParams {
    /// Class labels in index order.
    pub classes: Vec<String>,
}

/// Class order of [`Eligibility`], persisted with every artifact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LabelEncoder;

impl LabelEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Get the classes in index order.
    pub fn classes(&self) -> [Eligibility; 2] {
        Eligibility::CLASSES
    }

    pub fn extract_params(&self) -> LabelEncoderParams {
        LabelEncoderParams {
            classes: self
                .classes()
                .iter()
                .map(|c| c.label().to_string())
                .collect(),
        }
    }

    /// Accepts only parameters whose class order matches [`Eligibility`].
    pub fn from_params(params: LabelEncoderParams) -> Result<Self> {
        let expected = Self.extract_params();
        if params != expected {
            return Err(EligibilityError::InvalidInput(format!(
                "label order {:?} does not match {:?}",
                params.classes, expected.classes
            )));
        }
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_encoder_fixed_order() {
        let encoder = LabelEncoder::new();
        assert_eq!(
            encoder.classes(),
            [Eligibility::NotEligible, Eligibility::Eligible]
        );
        assert_eq!(
            encoder.extract_params().classes,
            vec!["Not Eligible".to_string(), "Eligible".to_string()]
        );
    }

    #[test]
    fn test_from_params_rejects_swapped_order() {
        let params = LabelEncoderParams {
            classes: vec!["Eligible".to_string(), "Not Eligible".to_string()],
        };
        assert!(LabelEncoder::from_params(params).is_err());
        assert!(LabelEncoder::from_params(LabelEncoder::new().extract_params()).is_ok());
    }
}
