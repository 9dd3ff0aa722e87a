//! Tree-ensemble classifier with compile-time training state.

pub mod forest;
pub mod state;
pub mod tree;

pub use forest::{ClassWeight, ForestConfig, ForestParams, MaxFeatures, RandomForest};
pub use state::{Fitted, Unfitted};
pub use tree::{DecisionTree, Node, TreeConfig};

use crate::error::Result;
use crate::serialization::SerializableParams;

/// Training interface, implemented only by `Unfitted` models.
pub trait TrainableModel {
    type Input: ?Sized;
    type Target: ?Sized;
    /// The fitted model produced by training.
    type Output: InferenceModel;

    /// Train on `input` rows against `target` labels.
    fn fit(&self, input: &Self::Input, target: &Self::Target) -> Result<Self::Output>;
}

/// Inference interface, implemented only by `Fitted` models.
pub trait InferenceModel {
    type InputSingle: ?Sized;
    type OutputSingle;
    type InputBatch: ?Sized;
    type OutputBatch;
    /// Serializable representation of the trained parameters.
    type ParamsRepr: SerializableParams;

    fn predict(&self, input: &Self::InputSingle) -> Result<Self::OutputSingle>;
    fn predict_batch(&self, input: &Self::InputBatch) -> Result<Self::OutputBatch>;

    fn extract_params(&self) -> Self::ParamsRepr;

    /// Rebuild from parameters, re-validating them.
    fn from_params(params: Self::ParamsRepr) -> Result<Self>
    where
        Self: Sized;
}
