//! Ground-truth labeling policy for the synthetic corpus.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//! 1. hard reject,
//! 2. hard accept,
//! 3. weighted score against the loan type's thresholds.
//!
//! All comparisons are exact; `<` in the reject rules is strict, so a value
//! sitting exactly on a minimum falls through to the later rules.

use crate::record::{ApplicantRecord, Eligibility, EmploymentStatus, LoanType};
use serde::{Deserialize, Serialize};

/// Eligibility thresholds for one loan product.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanCriteria {
    pub min_income: f64,
    pub preferred_income: f64,
    pub min_credit: u32,
    pub preferred_credit: u32,
}

impl LoanCriteria {
    /// Default thresholds for the products the generator draws.
    pub fn default_for(loan_type: LoanType) -> Option<Self> {
        let (min_income, preferred_income, min_credit, preferred_credit) = match loan_type {
            LoanType::Home => (50_000.0, 80_000.0, 640, 700),
            LoanType::Education => (30_000.0, 50_000.0, 620, 680),
            LoanType::Car => (25_000.0, 40_000.0, 600, 660),
            LoanType::Personal | LoanType::Business => return None,
        };
        Some(Self {
            min_income,
            preferred_income,
            min_credit,
            preferred_credit,
        })
    }
}

/// Income multiple of `preferred_income` required for a hard accept.
pub const HARD_ACCEPT_INCOME_MULTIPLE: f64 = 1.5;

/// Credit-score span that contributes one full point to the score.
const CREDIT_SCORE_SPAN: f64 = 200.0;

fn employment_bonus(status: EmploymentStatus) -> f64 {
    match status {
        EmploymentStatus::Employed => 0.5,
        EmploymentStatus::SelfEmployed => 0.3,
        EmploymentStatus::Unemployed => 0.0,
    }
}

/// Continuous score used for applicants that hit neither hard rule.
pub fn policy_score(record: &ApplicantRecord, criteria: &LoanCriteria) -> f64 {
    (record.credit_score as f64 - criteria.min_credit as f64) / CREDIT_SCORE_SPAN
        + (record.income - criteria.min_income) / criteria.min_income
        + employment_bonus(record.employment_status)
}

/// Assigns the ground-truth label for one applicant.
pub fn label_applicant(record: &ApplicantRecord, criteria: &LoanCriteria) -> Eligibility {
    if record.credit_score < criteria.min_credit
        || (record.employment_status == EmploymentStatus::Unemployed
            && record.loan_type != LoanType::Education)
        || record.income < criteria.min_income
    {
        return Eligibility::NotEligible;
    }

    if record.credit_score >= criteria.preferred_credit
        && record.income >= criteria.preferred_income * HARD_ACCEPT_INCOME_MULTIPLE
        && record.employment_status == EmploymentStatus::Employed
    {
        return Eligibility::Eligible;
    }

    if policy_score(record, criteria) > 1.0 {
        Eligibility::Eligible
    } else {
        Eligibility::NotEligible
    }
}
