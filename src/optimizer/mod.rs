//! Trade-size optimizers for flashloan-funded round trips.

pub mod flashloan;
pub mod quadratic;

pub use flashloan::flashloan_amount;
pub use quadratic::{QuadraticRoots, optimal_trade_size, optimize_trade_size_quadratic, solve_quadratic};

use crate::amm::{self, PoolState};
use crate::errors::Result;

/// Fraction of the shallowest relevant reserve a flashloan trade may touch.
/// Hard ceiling against pool-draining sizes and the numeric instability
/// that sets in near reserve exhaustion.
pub(crate) const LIQUIDITY_CAP_FRACTION: f64 = 0.30;

/// Upper bound of the search domain for a two-leg round trip.
///
/// Both reserves denominated in the borrowed token are relevant: the buy
/// pool's in-side (what the loan pushes in) and the sell pool's out-side
/// (what the exit drains). The intermediate hop asset is bounded through
/// them.
pub(crate) fn liquidity_cap(buy_pool: &PoolState, sell_pool: &PoolState) -> f64 {
    let (buy_in, _) = buy_pool.effective_reserves();
    let (_, sell_out) = sell_pool.effective_reserves();
    LIQUIDITY_CAP_FRACTION * buy_in.min(sell_out)
}

/// Net profit of borrowing `amount`, buying on one pool, selling on the
/// other, and repaying loan plus fee and gas.
pub(crate) fn round_trip_profit(
    buy_pool: &PoolState,
    sell_pool: &PoolState,
    amount: f64,
    flashloan_fee_pct: f64,
    gas_cost: f64,
) -> Result<f64> {
    let bought = amm::amount_out(buy_pool, amount)?;
    let recovered = amm::amount_out(sell_pool, bought)?;
    Ok(recovered - amount - amount * flashloan_fee_pct - gas_cost)
}
