//! Opportunity evaluation pipeline and parallel route simulation.

pub mod evaluator;
pub mod simulator;

pub use evaluator::{evaluate_opportunity, identify_opportunity};
pub use simulator::simulate_paths;
