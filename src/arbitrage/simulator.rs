//! Parallel simulation of flashloan-funded routes.

use crate::amm::PoolState;
use crate::errors::{EngineError, Result};
use crate::models::PathEvaluation;
use crate::slippage::multihop_quote;

/// Simulate a flashloan of `flashloan_amounts[i]` pushed through
/// `paths[i]`, for every path concurrently.
///
/// Each path runs on its own spawned task; results come back in input
/// order, tagged with `path_index`, regardless of completion order. A
/// negative per-path profit is a result, not an error. Mismatched input
/// lengths and empty paths are `InvalidInput`.
pub async fn simulate_paths(
    paths: &[Vec<PoolState>],
    flashloan_amounts: &[f64],
    flashloan_fee_pct: f64,
    gas_costs: &[f64],
) -> Result<Vec<PathEvaluation>> {
    if paths.len() != flashloan_amounts.len() || paths.len() != gas_costs.len() {
        return Err(EngineError::InvalidInput(format!(
            "got {} paths, {} amounts, {} gas costs; all three must match",
            paths.len(),
            flashloan_amounts.len(),
            gas_costs.len()
        )));
    }
    if !flashloan_fee_pct.is_finite() || flashloan_fee_pct < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "flashloan_fee_pct must be finite and non-negative, got {flashloan_fee_pct}"
        )));
    }

    let mut handles = Vec::with_capacity(paths.len());
    for (path_index, path) in paths.iter().enumerate() {
        let path = path.clone();
        let amount = flashloan_amounts[path_index];
        let gas_cost = gas_costs[path_index];
        handles.push(tokio::spawn(async move {
            let quote = multihop_quote(&path, amount)?;
            let profit = quote.amount_out - amount - amount * flashloan_fee_pct - gas_cost;
            tracing::debug!(path_index, profit, slippage_pct = quote.slippage_pct, "path simulated");
            Ok::<_, EngineError>(PathEvaluation {
                profit,
                slippage_pct: quote.slippage_pct,
                path_index,
            })
        }));
    }

    let mut evaluations = Vec::with_capacity(handles.len());
    for joined in futures::future::join_all(handles).await {
        evaluations.push(joined??);
    }
    Ok(evaluations)
}
