//! Slippage, market impact, and multi-hop propagation.
//!
//! Slippage measures how far a trade's execution price falls short of the
//! pool's ideal spot price; market impact measures how far the trade moves
//! the pool's spot price itself. Both are pure functions of a snapshot and
//! a trade size.

use crate::amm::{self, PoolState};
use crate::errors::{EngineError, Result};

/// Percentage price degradation of executing `amount_in` against the pool.
///
/// `(1 - amount_out / (amount_in * spot_price)) * 100`, clamped to be
/// non-negative. Strictly increasing in trade size for a fixed snapshot and
/// strictly decreasing in pool depth for a fixed trade.
pub fn slippage_pct(pool: &PoolState, amount_in: f64) -> Result<f64> {
    pool.validate()?;
    if !amount_in.is_finite() || amount_in < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "amount_in must be finite and non-negative, got {amount_in}"
        )));
    }
    if amount_in == 0.0 {
        return Ok(0.0);
    }
    let spot = pool.spot_price()?;
    let out = amm::amount_out(pool, amount_in)?;
    let ideal = amount_in * spot;
    if ideal <= 0.0 {
        return Err(EngineError::NumericDegenerate(format!(
            "ideal output collapsed to {ideal} for amount_in {amount_in}"
        )));
    }
    Ok(((1.0 - out / ideal) * 100.0).max(0.0))
}

/// Percentage deviation between the pool's spot price before and after the
/// trade. Bounded in `[0, 100)`: the post-trade price stays positive for
/// any finite trade.
pub fn market_impact_pct(pool: &PoolState, trade_amount: f64) -> Result<f64> {
    pool.validate()?;
    if !trade_amount.is_finite() || trade_amount < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "trade_amount must be finite and non-negative, got {trade_amount}"
        )));
    }
    if trade_amount == 0.0 {
        return Ok(0.0);
    }
    let spot_before = pool.spot_price()?;
    let out = amm::amount_out(pool, trade_amount)?;
    let spot_after = pool.after_trade(trade_amount, out).spot_price()?;
    Ok(((spot_before - spot_after).abs() / spot_before * 100.0).min(100.0 - f64::EPSILON))
}

/// Best (minimum) slippage across candidate routes, as an aggregator would
/// pick it.
pub fn aggregator_best_slippage(slippages: &[f64]) -> Result<f64> {
    if slippages.is_empty() {
        return Err(EngineError::InvalidInput(
            "cannot pick best route from an empty slippage set".to_string(),
        ));
    }
    Ok(slippages.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Outcome of pushing an amount through every hop of a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultihopQuote {
    /// Amount received from the final hop.
    pub amount_out: f64,
    /// Cumulative slippage versus the chained spot prices, in percent.
    pub slippage_pct: f64,
}

/// Propagate `amount` hop-by-hop through `path`, carrying each hop's output
/// into the next hop's input.
///
/// Cumulative slippage is measured against the ideal chained execution
/// `amount * prod(spot_i)`. Single-hop paths are fine; an empty path is
/// `InvalidInput`.
pub fn multihop_quote(path: &[PoolState], amount: f64) -> Result<MultihopQuote> {
    if path.is_empty() {
        return Err(EngineError::InvalidInput(
            "multi-hop path must contain at least one pool".to_string(),
        ));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "amount must be finite and non-negative, got {amount}"
        )));
    }
    let mut carried = amount;
    let mut ideal = amount;
    for pool in path {
        ideal *= pool.spot_price()?;
        carried = amm::amount_out(pool, carried)?;
    }
    let slippage_pct = if ideal > 0.0 {
        ((1.0 - carried / ideal) * 100.0).max(0.0)
    } else {
        0.0
    };
    Ok(MultihopQuote {
        amount_out: carried,
        slippage_pct,
    })
}

/// Cumulative slippage of the whole route, in percent.
pub fn multihop_slippage(path: &[PoolState], amount: f64) -> Result<f64> {
    Ok(multihop_quote(path, amount)?.slippage_pct)
}
