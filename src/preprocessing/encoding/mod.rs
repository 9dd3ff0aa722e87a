//! Categorical feature and target label encoding.
//!
//! # Available Encoders
//!
//! ## CategoricalEncoder
//! Maps string category labels to integer ordinals (0, 1, 2, ...), sorted by
//! label. Values not seen during fit are an error, never a silent new index.
//!
//! ```ignore
//! // Fit on:    ["Home Loan", "Car Loan", "Education Loan"]
//! // Mapping:   Car Loan -> 0, Education Loan -> 1, Home Loan -> 2
//! // Transform: ["Personal Loan"] -> Err(UnknownCategory)
//! ```
//!
//! ## LabelEncoder
//! Encodes the binary target. Its order is fixed: `Not Eligible = 0`,
//! `Eligible = 1`.

mod categorical;
mod label;

pub use categorical::{CategoricalEncoder, CategoricalEncoderParams, FittedCategoricalEncoder};
pub use label::{LabelEncoder, LabelEncoderParams};
