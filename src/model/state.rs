/// A marker type indicating that a model is **not yet trained**.
///
/// This phantom type is used in generic parameters (e.g. `RandomForest<Unfitted>`)
/// to enforce compile-time guarantees:
/// - Only an `Unfitted` model exposes `fit`.
/// - Prediction and parameter export are **not available** until `fit`
///   returns the `Fitted` counterpart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unfitted;

/// A marker type indicating that a model has been **fully trained**.
///
/// A `Fitted` model contains only what prediction needs (the grown trees);
/// bootstrap draws and class weights are discarded after training.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fitted;
