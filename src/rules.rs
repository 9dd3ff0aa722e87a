//! Post-classification business rules.
//!
//! Rules are evaluated per record after the classifier has produced a label.
//! Rejections are checked first; an acceptance rule can only fire when no
//! rejection did. The layer works on [`Eligibility`] values, never raw class
//! indices, so it cannot produce a label outside the shared label space.

use crate::record::{ApplicantRecord, Eligibility, EmploymentStatus, LoanType};
use serde::{Deserialize, Serialize};
use std::fmt;

const CREDIT_FLOOR: u32 = 500;
const HOME_LOAN_MIN_INCOME: f64 = 25_000.0;
const EXCEPTIONAL_CREDIT: u32 = 800;
const EXCEPTIONAL_INCOME: f64 = 150_000.0;

/// A business rule that replaced the classifier's label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverrideRule {
    /// Credit score below 500.
    CreditBelowFloor,
    /// Unemployed applicant requesting a home loan.
    UnemployedHomeLoan,
    /// Home loan requested on an income below 25,000.
    LowIncomeHomeLoan,
    /// Credit above 800, income above 150,000 and employed.
    ExceptionalProfile,
}

impl OverrideRule {
    /// Rejection rules in evaluation order.
    pub const REJECTIONS: [OverrideRule; 3] = [
        OverrideRule::CreditBelowFloor,
        OverrideRule::UnemployedHomeLoan,
        OverrideRule::LowIncomeHomeLoan,
    ];

    /// Label the rule forces.
    pub fn outcome(self) -> Eligibility {
        match self {
            OverrideRule::ExceptionalProfile => Eligibility::Eligible,
            _ => Eligibility::NotEligible,
        }
    }

    pub fn matches(self, r: &ApplicantRecord) -> bool {
        match self {
            OverrideRule::CreditBelowFloor => r.credit_score < CREDIT_FLOOR,
            OverrideRule::UnemployedHomeLoan => {
                r.employment_status == EmploymentStatus::Unemployed && r.loan_type == LoanType::Home
            }
            OverrideRule::LowIncomeHomeLoan => {
                r.income < HOME_LOAN_MIN_INCOME && r.loan_type == LoanType::Home
            }
            OverrideRule::ExceptionalProfile => {
                r.credit_score > EXCEPTIONAL_CREDIT
                    && r.income > EXCEPTIONAL_INCOME
                    && r.employment_status == EmploymentStatus::Employed
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OverrideRule::CreditBelowFloor => "credit_below_floor",
            OverrideRule::UnemployedHomeLoan => "unemployed_home_loan",
            OverrideRule::LowIncomeHomeLoan => "low_income_home_loan",
            OverrideRule::ExceptionalProfile => "exceptional_profile",
        }
    }
}

impl fmt::Display for OverrideRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First rule that fires for `record`, if any.
pub fn matching_rule(record: &ApplicantRecord) -> Option<OverrideRule> {
    OverrideRule::REJECTIONS
        .into_iter()
        .find(|rule| rule.matches(record))
        .or_else(|| {
            OverrideRule::ExceptionalProfile
                .matches(record)
                .then_some(OverrideRule::ExceptionalProfile)
        })
}

/// Final label for one record, plus the rule that decided it (if any).
///
/// Pure: the model's label is only read, never modified in place.
pub fn apply(record: &ApplicantRecord, predicted: Eligibility) -> (Eligibility, Option<OverrideRule>) {
    match matching_rule(record) {
        Some(rule) => (rule.outcome(), Some(rule)),
        None => (predicted, None),
    }
}

/// [`apply`] over a batch, producing a new sequence.
pub fn apply_all(
    records: &[ApplicantRecord],
    predicted: &[Eligibility],
) -> Vec<(Eligibility, Option<OverrideRule>)> {
    records
        .iter()
        .zip(predicted)
        .map(|(r, &p)| apply(r, p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(income: f64, credit: u32, e: EmploymentStatus, l: LoanType) -> ApplicantRecord {
        ApplicantRecord::new(income, credit, e, l).unwrap()
    }

    #[test]
    fn test_low_credit_home_loan_always_rejected() {
        for e in EmploymentStatus::ALL {
            for income in [20_000.0, 80_000.0, 400_000.0] {
                let r = rec(income, 450, e, LoanType::Home);
                for model in Eligibility::CLASSES {
                    assert_eq!(apply(&r, model).0, Eligibility::NotEligible);
                }
            }
        }
    }

    #[test]
    fn test_exceptional_profile_always_accepted() {
        for l in LoanType::ALL {
            let r = rec(200_000.0, 820, EmploymentStatus::Employed, l);
            for model in Eligibility::CLASSES {
                assert_eq!(
                    apply(&r, model),
                    (Eligibility::Eligible, Some(OverrideRule::ExceptionalProfile))
                );
            }
        }
    }

    #[test]
    fn test_rejection_checked_before_acceptance() {
        // rich and high credit, but unemployed home loan
        let r = rec(300_000.0, 840, EmploymentStatus::Unemployed, LoanType::Home);
        assert_eq!(
            apply(&r, Eligibility::Eligible),
            (Eligibility::NotEligible, Some(OverrideRule::UnemployedHomeLoan))
        );
    }

    #[test]
    fn test_low_income_home_loan() {
        let r = rec(24_999.0, 700, EmploymentStatus::Employed, LoanType::Home);
        assert_eq!(
            apply(&r, Eligibility::Eligible).1,
            Some(OverrideRule::LowIncomeHomeLoan)
        );
        let car = rec(24_999.0, 700, EmploymentStatus::Employed, LoanType::Car);
        assert_eq!(apply(&car, Eligibility::Eligible), (Eligibility::Eligible, None));
    }

    #[test]
    fn test_boundaries_are_strict() {
        let at_floor = rec(60_000.0, 500, EmploymentStatus::Employed, LoanType::Car);
        assert_eq!(matching_rule(&at_floor), None);
        let at_accept = rec(150_000.0, 800, EmploymentStatus::Employed, LoanType::Car);
        assert_eq!(matching_rule(&at_accept), None);
        let self_employed = rec(200_000.0, 820, EmploymentStatus::SelfEmployed, LoanType::Car);
        assert_eq!(matching_rule(&self_employed), None);
    }

    #[test]
    fn test_no_rule_keeps_model_label() {
        let r = rec(70_000.0, 690, EmploymentStatus::SelfEmployed, LoanType::Education);
        for model in Eligibility::CLASSES {
            assert_eq!(apply(&r, model), (model, None));
        }
    }

    #[test]
    fn test_output_index_stays_in_label_space() {
        let records: Vec<ApplicantRecord> = [300, 499, 500, 650, 801, 850]
            .iter()
            .flat_map(|&c| {
                LoanType::ALL.into_iter().flat_map(move |l| {
                    EmploymentStatus::ALL
                        .into_iter()
                        .map(move |e| rec(160_000.0, c, e, l))
                })
            })
            .collect();
        for model in Eligibility::CLASSES {
            let predicted = vec![model; records.len()];
            for (label, _) in apply_all(&records, &predicted) {
                assert!(label.index() <= 1);
                assert_eq!(Eligibility::from_index(label.index()).unwrap(), label);
            }
        }
    }
}
