//! A trained pipeline: fit state, forest and label encoder as one unit.
//!
//! The three parts are only ever constructed together, either by a training
//! run or by loading one artifact, so a forest can never meet a fit state
//! from a different run.

use crate::affordability::{self, Affordability, LoanTerms};
use crate::artifact::{self, ArtifactMetadata, ArtifactPayload};
use crate::error::{EligibilityError, Result};
use crate::model::{Fitted, InferenceModel, RandomForest};
use crate::preprocessing::{FitState, FittedTransformer, LabelEncoder};
use crate::record::{ApplicantRecord, Eligibility};
use crate::rules::{self, OverrideRule};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Outcome for one applicant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Final label after business rules.
    pub label: Eligibility,
    /// Model probability of `Eligible`. Rules do not change it.
    pub probability: f64,
    /// Certainty in `label`: the model's probability of its own class, or
    /// 1.0 when a business rule decided the label.
    pub confidence: f64,
    /// Label the model predicted before rules.
    pub model_label: Eligibility,
    /// Rule that replaced the model label, if one fired.
    pub override_rule: Option<OverrideRule>,
    /// Advisory repayment estimate, when loan terms were supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affordability: Option<Affordability>,
}

impl Decision {
    fn new(record: &ApplicantRecord, model_label: Eligibility, probability: f64) -> Self {
        let (label, override_rule) = rules::apply(record, model_label);
        if let Some(rule) = override_rule {
            debug!(
                rule = %rule,
                model_label = %model_label,
                label = %label,
                "Override rule fired"
            );
        }
        Self {
            label,
            probability,
            confidence: match override_rule {
                Some(_) => 1.0,
                None => probability.max(1.0 - probability),
            },
            model_label,
            override_rule,
            affordability: None,
        }
    }

    pub fn is_overridden(&self) -> bool {
        self.override_rule.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct TrainedPipeline {
    fit_state: FitState,
    forest: RandomForest<Fitted>,
    label_encoder: LabelEncoder,
    metadata: ArtifactMetadata,
}

impl TrainedPipeline {
    pub fn new(fit_state: FitState, forest: RandomForest<Fitted>, metadata: ArtifactMetadata) -> Self {
        Self {
            fit_state,
            forest,
            label_encoder: LabelEncoder::new(),
            metadata,
        }
    }

    pub fn fit_state(&self) -> &FitState {
        &self.fit_state
    }

    pub fn forest(&self) -> &RandomForest<Fitted> {
        &self.forest
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    /// Decide one applicant.
    ///
    /// # Errors
    /// - [`EligibilityError::InvalidInput`] for an out-of-range record
    /// - [`EligibilityError::UnknownCategory`] for a category unseen in training
    pub fn predict(&self, record: &ApplicantRecord) -> Result<Decision> {
        let features = self.fit_state.transform_one(record)?;
        let (model_label, probability) = self.forest.predict(&features)?;
        Ok(Decision::new(record, model_label, probability))
    }

    /// [`Self::predict`] plus an advisory affordability estimate.
    pub fn predict_with_terms(
        &self,
        record: &ApplicantRecord,
        terms: Option<&LoanTerms>,
    ) -> Result<Decision> {
        let mut decision = self.predict(record)?;
        if let Some(terms) = terms {
            decision.affordability = Some(affordability::estimate(record.income, terms)?);
        }
        Ok(decision)
    }

    /// Decide a batch. Fails as a whole on the first invalid record.
    pub fn predict_batch(&self, records: &[ApplicantRecord]) -> Result<Vec<Decision>> {
        let x = self.fit_state.to_matrix(records)?;
        let predictions = self.forest.predict_batch(&x)?;
        Ok(records
            .iter()
            .zip(predictions)
            .map(|(r, (label, p))| Decision::new(r, label, p))
            .collect())
    }

    pub fn to_payload(&self) -> ArtifactPayload {
        ArtifactPayload {
            forest: self.forest.extract_params(),
            fit_state: self.fit_state.extract_params(),
            label_encoder: self.label_encoder.extract_params(),
            metadata: self.metadata.clone(),
        }
    }

    /// Rebuild from a decoded payload. Any invalid part rejects the whole payload.
    pub fn from_payload(payload: ArtifactPayload) -> Result<Self> {
        let invalid = |part: &str, e: EligibilityError| {
            EligibilityError::ArtifactLoad(format!("invalid {}: {}", part, e))
        };
        let label_encoder =
            LabelEncoder::from_params(payload.label_encoder).map_err(|e| invalid("label encoder", e))?;
        let fit_state =
            FitState::from_params(payload.fit_state).map_err(|e| invalid("fit state", e))?;
        let forest =
            RandomForest::<Fitted>::from_params(payload.forest).map_err(|e| invalid("forest", e))?;
        Ok(Self {
            fit_state,
            forest,
            label_encoder,
            metadata: payload.metadata,
        })
    }

    /// Save as one artifact file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        artifact::save(path, &self.to_payload())
    }

    /// Load a pipeline saved with [`Self::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let pipeline = Self::from_payload(artifact::load(path)?)?;
        info!(
            path = %path.display(),
            trees = pipeline.forest.n_trees(),
            trained_with = %pipeline.metadata.crate_version,
            "Pipeline loaded"
        );
        Ok(pipeline)
    }
}
