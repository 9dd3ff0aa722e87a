//! Scaling transformers for numeric features.
//!
//! The eligibility pipeline standardizes income, credit score and the
//! income-to-loan ratio with [`StandardScaler`].

pub mod standard;

pub use standard::{FittedStandardScaler, StandardScaler, StandardScalerParams};
