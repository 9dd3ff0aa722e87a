//! Synthetic labeled corpus generation.
//!
//! Feature sampling is the only source of randomness; labels come from the
//! deterministic policy in [`super::policy`]. The RNG is a seeded ChaCha
//! stream, so the same `(n, seed, config)` always produces the same corpus
//! on every platform.

use crate::dataset::policy::{label_applicant, LoanCriteria};
use crate::error::{EligibilityError, Result};
use crate::record::{ApplicantRecord, EmploymentStatus, LabeledRecord, LoanType};
use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{LogNormal, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 42;

/// A loan product the generator can draw, with its sampling weight and thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanProduct {
    pub loan_type: LoanType,
    pub weight: f64,
    pub criteria: LoanCriteria,
}

/// Distribution parameters for the synthetic corpus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Mean of the underlying normal for the log-normal income draw.
    pub income_log_mean: f64,
    /// Sigma of the underlying normal for the log-normal income draw.
    pub income_log_sigma: f64,
    pub income_min: f64,
    pub income_max: f64,
    pub credit_mean: f64,
    pub credit_std: f64,
    pub employment_weights: Vec<(EmploymentStatus, f64)>,
    pub products: Vec<LoanProduct>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let products = [
            (LoanType::Home, 0.35),
            (LoanType::Education, 0.25),
            (LoanType::Car, 0.40),
        ]
        .into_iter()
        .filter_map(|(loan_type, weight)| {
            LoanCriteria::default_for(loan_type).map(|criteria| LoanProduct {
                loan_type,
                weight,
                criteria,
            })
        })
        .collect();
        Self {
            income_log_mean: 11.0,
            income_log_sigma: 0.5,
            income_min: 20_000.0,
            income_max: 500_000.0,
            credit_mean: 680.0,
            credit_std: 80.0,
            employment_weights: vec![
                (EmploymentStatus::Employed, 0.75),
                (EmploymentStatus::SelfEmployed, 0.20),
                (EmploymentStatus::Unemployed, 0.05),
            ],
            products,
        }
    }
}

impl GeneratorConfig {
    /// Checks that every distribution can actually be sampled.
    pub fn validate(&self) -> Result<()> {
        if !(self.income_log_sigma.is_finite() && self.income_log_sigma > 0.0) {
            return Err(EligibilityError::Config(
                "income_log_sigma must be positive".to_string(),
            ));
        }
        if !(self.credit_std.is_finite() && self.credit_std > 0.0) {
            return Err(EligibilityError::Config(
                "credit_std must be positive".to_string(),
            ));
        }
        if !(self.income_min > 0.0 && self.income_min <= self.income_max) {
            return Err(EligibilityError::Config(format!(
                "income range [{}, {}] is invalid",
                self.income_min, self.income_max
            )));
        }
        if self.employment_weights.is_empty() || self.products.is_empty() {
            return Err(EligibilityError::Config(
                "employment weights and products must be non-empty".to_string(),
            ));
        }
        for product in &self.products {
            if product.criteria.min_income <= 0.0 {
                return Err(EligibilityError::Config(format!(
                    "{} needs a positive min_income",
                    product.loan_type
                )));
            }
        }
        Ok(())
    }
}

/// Produces labeled training rows from a fixed distribution and policy.
#[derive(Clone, Debug)]
pub struct PolicyGenerator {
    config: GeneratorConfig,
}

impl Default for PolicyGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl PolicyGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Draws `n` labeled rows. Deterministic for a given `n` and `seed`.
    ///
    /// # Errors
    /// - [`EligibilityError::InvalidInput`] if `n == 0`
    /// - [`EligibilityError::Config`] if the configuration cannot be sampled
    pub fn generate(&self, n: usize, seed: u64) -> Result<Vec<LabeledRecord>> {
        if n == 0 {
            return Err(EligibilityError::InvalidInput(
                "corpus size must be positive".to_string(),
            ));
        }
        self.config.validate()?;

        let cfg = &self.config;
        let income_dist = LogNormal::new(cfg.income_log_mean, cfg.income_log_sigma)
            .map_err(|e| EligibilityError::Config(format!("income distribution: {}", e)))?;
        let credit_dist = Normal::new(cfg.credit_mean, cfg.credit_std)
            .map_err(|e| EligibilityError::Config(format!("credit distribution: {}", e)))?;
        let employment_dist = WeightedIndex::new(cfg.employment_weights.iter().map(|(_, w)| *w))
            .map_err(|e| EligibilityError::Config(format!("employment weights: {}", e)))?;
        let product_dist = WeightedIndex::new(cfg.products.iter().map(|p| p.weight))
            .map_err(|e| EligibilityError::Config(format!("product weights: {}", e)))?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut rows = Vec::with_capacity(n);

        for _ in 0..n {
            let income = income_dist
                .sample(&mut rng)
                .clamp(cfg.income_min, cfg.income_max);
            // Clamp first, then truncate: the score is an integer in [300, 850].
            let credit_score = credit_dist.sample(&mut rng).clamp(300.0, 850.0) as u32;
            let employment_status = cfg.employment_weights[employment_dist.sample(&mut rng)].0;
            let product = &cfg.products[product_dist.sample(&mut rng)];

            let applicant = ApplicantRecord {
                income,
                credit_score,
                employment_status,
                loan_type: product.loan_type,
            };
            let eligibility = label_applicant(&applicant, &product.criteria);
            rows.push(LabeledRecord {
                applicant,
                eligibility,
            });
        }

        debug!(n, seed, "generated synthetic corpus");
        Ok(rows)
    }
}

/// Generates `n` rows with the default distributions and policy.
pub fn generate(n: usize, seed: u64) -> Result<Vec<LabeledRecord>> {
    PolicyGenerator::default().generate(n, seed)
}
