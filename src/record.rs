//! Applicant records and the shared label space.
//!
//! [`Eligibility`] is the one place that decides which integer means which
//! label. The label encoder, the forest output and the rule override layer
//! all go through it instead of agreeing on raw integers.

use crate::error::{EligibilityError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowest valid credit score.
pub const MIN_CREDIT_SCORE: u32 = 300;
/// Highest valid credit score.
pub const MAX_CREDIT_SCORE: u32 = 850;

/// Employment status of an applicant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EmploymentStatus {
    Employed,
    SelfEmployed,
    Unemployed,
}

impl EmploymentStatus {
    pub const ALL: [EmploymentStatus; 3] = [
        EmploymentStatus::Employed,
        EmploymentStatus::SelfEmployed,
        EmploymentStatus::Unemployed,
    ];

    /// Canonical label, also used as the categorical encoder key.
    pub fn label(self) -> &'static str {
        match self {
            EmploymentStatus::Employed => "Employed",
            EmploymentStatus::SelfEmployed => "Self-employed",
            EmploymentStatus::Unemployed => "Unemployed",
        }
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EmploymentStatus {
    type Err = EligibilityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employed" => Ok(EmploymentStatus::Employed),
            "self-employed" | "self_employed" | "selfemployed" => Ok(EmploymentStatus::SelfEmployed),
            "unemployed" => Ok(EmploymentStatus::Unemployed),
            other => Err(EligibilityError::InvalidInput(format!(
                "unrecognised employment status '{}'",
                other
            ))),
        }
    }
}

/// Loan product requested by the applicant.
///
/// `Personal` and `Business` are valid products, but the synthetic policy
/// never produces them, so a default-trained artifact has no encoding for them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoanType {
    Home,
    Education,
    Car,
    Personal,
    Business,
}

impl LoanType {
    pub const ALL: [LoanType; 5] = [
        LoanType::Home,
        LoanType::Education,
        LoanType::Car,
        LoanType::Personal,
        LoanType::Business,
    ];

    /// Canonical label, also used as the categorical encoder key.
    pub fn label(self) -> &'static str {
        match self {
            LoanType::Home => "Home Loan",
            LoanType::Education => "Education Loan",
            LoanType::Car => "Car Loan",
            LoanType::Personal => "Personal Loan",
            LoanType::Business => "Business Loan",
        }
    }

    /// Fixed typical principal for the product, used by the income ratio feature.
    pub fn typical_loan_amount(self) -> f64 {
        match self {
            LoanType::Home => 250_000.0,
            LoanType::Education => 50_000.0,
            LoanType::Car => 35_000.0,
            LoanType::Personal | LoanType::Business => 50_000.0,
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LoanType {
    type Err = EligibilityError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        let key = key.strip_suffix(" loan").unwrap_or(&key);
        match key {
            "home" => Ok(LoanType::Home),
            "education" => Ok(LoanType::Education),
            "car" => Ok(LoanType::Car),
            "personal" => Ok(LoanType::Personal),
            "business" => Ok(LoanType::Business),
            other => Err(EligibilityError::InvalidInput(format!(
                "unrecognised loan type '{}'",
                other
            ))),
        }
    }
}

/// Binary eligibility label with a fixed index mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Eligibility {
    NotEligible = 0,
    Eligible = 1,
}

impl Eligibility {
    /// Labels in index order.
    pub const CLASSES: [Eligibility; 2] = [Eligibility::NotEligible, Eligibility::Eligible];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(Eligibility::NotEligible),
            1 => Ok(Eligibility::Eligible),
            other => Err(EligibilityError::InvalidInput(format!(
                "label index {} outside {{0, 1}}",
                other
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Eligibility::NotEligible => "Not Eligible",
            Eligibility::Eligible => "Eligible",
        }
    }

    pub fn is_eligible(self) -> bool {
        self == Eligibility::Eligible
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One prediction request or one unlabeled training row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    /// Annual income.
    pub income: f64,
    pub credit_score: u32,
    pub employment_status: EmploymentStatus,
    pub loan_type: LoanType,
}

impl ApplicantRecord {
    /// Builds a validated record.
    ///
    /// # Errors
    /// [`EligibilityError::InvalidInput`] if income is not a positive finite
    /// number or the credit score lies outside `[300, 850]`.
    pub fn new(
        income: f64,
        credit_score: u32,
        employment_status: EmploymentStatus,
        loan_type: LoanType,
    ) -> Result<Self> {
        let record = Self {
            income,
            credit_score,
            employment_status,
            loan_type,
        };
        record.validate()?;
        Ok(record)
    }

    /// Re-checks range constraints, for records built with struct literals or
    /// deserialized from untrusted input.
    pub fn validate(&self) -> Result<()> {
        if !self.income.is_finite() || self.income <= 0.0 {
            return Err(EligibilityError::InvalidInput(format!(
                "income must be a positive number, got {}",
                self.income
            )));
        }
        if !(MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE).contains(&self.credit_score) {
            return Err(EligibilityError::InvalidInput(format!(
                "credit score must be between {} and {}, got {}",
                MIN_CREDIT_SCORE, MAX_CREDIT_SCORE, self.credit_score
            )));
        }
        Ok(())
    }
}

/// A training row: applicant plus ground-truth label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabeledRecord {
    #[serde(flatten)]
    pub applicant: ApplicantRecord,
    pub eligibility: Eligibility,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligibility_index_mapping_is_fixed() {
        assert_eq!(Eligibility::NotEligible.index(), 0);
        assert_eq!(Eligibility::Eligible.index(), 1);
        assert_eq!(Eligibility::from_index(0).unwrap(), Eligibility::NotEligible);
        assert_eq!(Eligibility::from_index(1).unwrap(), Eligibility::Eligible);
    }

    #[test]
    fn test_eligibility_from_index_rejects_out_of_range() {
        assert!(matches!(
            Eligibility::from_index(2),
            Err(EligibilityError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_record_validation() {
        assert!(ApplicantRecord::new(50_000.0, 700, EmploymentStatus::Employed, LoanType::Car).is_ok());
        assert!(ApplicantRecord::new(0.0, 700, EmploymentStatus::Employed, LoanType::Car).is_err());
        assert!(ApplicantRecord::new(-5.0, 700, EmploymentStatus::Employed, LoanType::Car).is_err());
        assert!(ApplicantRecord::new(f64::NAN, 700, EmploymentStatus::Employed, LoanType::Car).is_err());
        assert!(ApplicantRecord::new(50_000.0, 299, EmploymentStatus::Employed, LoanType::Car).is_err());
        assert!(ApplicantRecord::new(50_000.0, 851, EmploymentStatus::Employed, LoanType::Car).is_err());
        assert!(ApplicantRecord::new(50_000.0, 300, EmploymentStatus::Employed, LoanType::Car).is_ok());
        assert!(ApplicantRecord::new(50_000.0, 850, EmploymentStatus::Employed, LoanType::Car).is_ok());
    }

    #[test]
    fn test_loan_type_parse_accepts_label_and_short_form() {
        assert_eq!("Home Loan".parse::<LoanType>().unwrap(), LoanType::Home);
        assert_eq!("car".parse::<LoanType>().unwrap(), LoanType::Car);
        assert_eq!("Business".parse::<LoanType>().unwrap(), LoanType::Business);
        assert!("boat".parse::<LoanType>().is_err());
        for lt in LoanType::ALL {
            assert_eq!(lt.label().parse::<LoanType>().unwrap(), lt);
        }
    }

    #[test]
    fn test_employment_parse_round_trips_labels() {
        for status in EmploymentStatus::ALL {
            assert_eq!(status.label().parse::<EmploymentStatus>().unwrap(), status);
        }
        assert!("retired".parse::<EmploymentStatus>().is_err());
    }
}
