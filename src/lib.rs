//! # loan-eligibility
//!
//! A loan-eligibility decision engine with strict separation between training
//! and inference state.
//!
//! ## Core Design Principles
//!
//! - **Fit once, apply many**: encoders and scaler statistics are learned once
//!   into an immutable [`FitState`](preprocessing::FitState) and reused verbatim
//!   at inference.
//! - **Stateful Type Safety**: the forest carries its training state in the type
//!   system (`RandomForest<Unfitted>` vs `RandomForest<Fitted>`).
//! - **One label space**: [`Eligibility`] fixes `NotEligible = 0, Eligible = 1`
//!   for the label encoder, the classifier and the business rules alike.
//! - **One artifact**: fit state, forest and label encoder are saved and loaded
//!   together, atomically, with a checksum.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use loan_eligibility::{DecisionEngine, Trainer, TrainingConfig};
//! use loan_eligibility::record::{ApplicantRecord, EmploymentStatus, LoanType};
//!
//! # fn main() -> loan_eligibility::Result<()> {
//! let pipeline = Trainer::builder(TrainingConfig::default()).build()?.run()?;
//! pipeline.save("loan_eligibility_model.bin")?;
//!
//! let engine = DecisionEngine::open("loan_eligibility_model.bin")?;
//! let applicant =
//!     ApplicantRecord::new(60_000.0, 700, EmploymentStatus::SelfEmployed, LoanType::Education)?;
//! let (label, probability) = engine.predict(&applicant)?;
//! println!("{} ({:.1}%)", label, probability * 100.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - `record`: applicant records and the shared label enum
//! - `dataset`: synthetic policy generator, corpus split and CSV
//! - `preprocessing`: derived features, categorical encoders, standard scaler
//! - `model`: CART trees and the random forest
//! - `rules`: post-classification business overrides
//! - `trainer`: training run orchestration
//! - `artifact`: on-disk format
//! - `engine`: read-only inference facade

pub mod affordability;
pub mod artifact;
pub mod config;

/// Labeled corpus generation and handling.
pub mod dataset;

pub mod engine;
pub mod error;
pub mod evaluation;

/// Tree-ensemble classifier with compile-time state safety.
pub mod model;

pub mod pipeline;

/// Feature preprocessing with immutable fit state.
pub mod preprocessing;

pub mod record;
pub mod rules;

/// Byte-level (de)serialization of fitted parameters.
pub mod serialization;

/// Training run orchestration.
pub mod trainer;

pub use affordability::{Affordability, LoanTerms};
pub use config::TrainingConfig;
pub use engine::DecisionEngine;
pub use error::{EligibilityError, Result};
pub use pipeline::{Decision, TrainedPipeline};
pub use record::{ApplicantRecord, Eligibility, EmploymentStatus, LoanType};
pub use rules::OverrideRule;
pub use trainer::{Trainer, TrainerBuilder};
