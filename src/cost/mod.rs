pub mod estimator;
pub mod model;

pub use estimator::{CostEstimator, CostGateOutcome, DEFAULT_SEVERE_OVERAGE_PCT};
pub use model::{Amount, ComponentCost, CostModel, RawCostItem};
