//! Advisory repayment estimate for a requested loan.
//!
//! The figures here are informational only. They are attached to a
//! [`Decision`](crate::pipeline::Decision) but never change its label.

use crate::error::{EligibilityError, Result};
use serde::{Deserialize, Serialize};

/// Fixed annual interest rate used for the estimate.
pub const ANNUAL_INTEREST_RATE: f64 = 0.10;

/// Debt-to-income percentage above which the estimate is flagged.
pub const DTI_ADVISORY_LIMIT: f64 = 45.0;

/// Principal and repayment period of a requested loan.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub amount: f64,
    pub term_months: u32,
}

impl LoanTerms {
    pub fn new(amount: f64, term_months: u32) -> Result<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EligibilityError::InvalidInput(format!(
                "loan amount must be a positive number, got {}",
                amount
            )));
        }
        if term_months == 0 {
            return Err(EligibilityError::InvalidInput(
                "loan term must be at least one month".to_string(),
            ));
        }
        Ok(Self {
            amount,
            term_months,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Affordability {
    /// Equated monthly instalment.
    pub monthly_payment: f64,
    /// Monthly payment as a percentage of monthly income.
    pub debt_to_income: f64,
    pub loan_to_income: f64,
    /// `debt_to_income` is above [`DTI_ADVISORY_LIMIT`].
    pub exceeds_dti_limit: bool,
}

/// Standard amortised payment `P·r·(1+r)^n / ((1+r)^n − 1)` at the fixed rate.
pub fn monthly_payment(terms: &LoanTerms) -> f64 {
    let r = ANNUAL_INTEREST_RATE / 12.0;
    let growth = (1.0 + r).powi(terms.term_months as i32);
    terms.amount * r * growth / (growth - 1.0)
}

/// Estimate affordability of `terms` for an applicant with annual `income`.
pub fn estimate(income: f64, terms: &LoanTerms) -> Result<Affordability> {
    if !income.is_finite() || income <= 0.0 {
        return Err(EligibilityError::InvalidInput(format!(
            "income must be a positive number, got {}",
            income
        )));
    }
    let payment = monthly_payment(terms);
    let debt_to_income = payment / (income / 12.0) * 100.0;
    Ok(Affordability {
        monthly_payment: payment,
        debt_to_income,
        loan_to_income: terms.amount / income,
        exceeds_dti_limit: debt_to_income > DTI_ADVISORY_LIMIT,
    })
}
