//! Arbitrage economics engine.
//!
//! Pure calculation layer for flashloan arbitrage over AMM pool snapshots:
//! pricing curves (constant-product, concentrated-liquidity, StableSwap,
//! weighted), slippage and market-impact analysis, TWAP manipulation
//! checks, trade sizing, and a gated go/no-go evaluation pipeline. The
//! engine owns no I/O; callers feed it pool states and price series and
//! decide what to do with the verdicts.

pub mod amm;
pub mod arbitrage;
pub mod config;
pub mod errors;
pub mod models;
pub mod optimizer;
pub mod slippage;
pub mod twap;
pub mod utils;

pub use amm::PoolState;
pub use arbitrage::{evaluate_opportunity, identify_opportunity, simulate_paths};
pub use config::ArbitrageConfig;
pub use errors::{EngineError, Result};
pub use models::{OpportunityEvaluation, PathEvaluation, PriceSample, TradeDirection};
pub use optimizer::{flashloan_amount, optimal_trade_size, optimize_trade_size_quadratic};
