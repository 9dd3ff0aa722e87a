//! Feature preprocessing for applicant records.
//!
//! # Design
//!
//! - **Fit once**: [`FeaturePreprocessor::fit`] learns category mappings and
//!   scaler statistics and returns them as an immutable [`FitState`].
//! - **Apply many**: [`FitState::transform`] reuses those parameters as-is.
//!   A category absent at fit time is an [`UnknownCategory`] error.
//! - **Serializable**: every fitted component round-trips through a plain
//!   `*Params` struct (see [`crate::serialization`]).
//!
//! # Core Traits
//!
//! - [`Transformer`]: unfitted transformer with hyperparameters
//! - [`FittedTransformer`]: fitted transformer ready for inference
//!
//! # Example
//!
//! ```rust
//! use loan_eligibility::preprocessing::{fit_transform, transform};
//! use loan_eligibility::record::{ApplicantRecord, EmploymentStatus, LoanType};
//!
//! let rows = vec![
//!     ApplicantRecord::new(60_000.0, 710, EmploymentStatus::Employed, LoanType::Car).unwrap(),
//!     ApplicantRecord::new(95_000.0, 655, EmploymentStatus::SelfEmployed, LoanType::Home).unwrap(),
//! ];
//! let (features, state) = fit_transform(&rows).unwrap();
//! assert_eq!(transform(&rows, &state).unwrap(), features);
//! ```
//!
//! [`UnknownCategory`]: crate::error::EligibilityError::UnknownCategory

pub mod encoding;
pub mod features;
pub mod preprocessor;
pub mod scaling;
pub mod traits;

pub use encoding::{
    CategoricalEncoder, CategoricalEncoderParams, FittedCategoricalEncoder, LabelEncoder,
    LabelEncoderParams,
};
pub use features::{income_to_loan_ratio, DerivedFeatureSet, FEATURE_NAMES, N_FEATURES};
pub use preprocessor::{fit_transform, transform, FeaturePreprocessor, FitState, FitStateParams};
pub use scaling::{FittedStandardScaler, StandardScaler, StandardScalerParams};
pub use traits::{FittedTransformer, Transformer};
