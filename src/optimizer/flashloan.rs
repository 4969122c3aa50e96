//! Flashloan sizing by bounded grid scan plus golden-section refinement.
//!
//! The profit curve of a two-leg round trip is unimodal when both legs are
//! constant-product, but that is not guaranteed across mixed curve types
//! (StableSwap buy leg against a weighted sell leg, say). A pure ternary
//! search can lock onto the wrong slope there, so the domain is first
//! scanned on a coarse grid to bracket the global peak and only then
//! refined by golden-section search inside the winning bracket. Total work
//! is hard-capped at `GRID_CELLS + REFINE_ITERATIONS + 1` profit
//! evaluations regardless of input.

use super::{liquidity_cap, round_trip_profit};
use crate::amm::PoolState;
use crate::errors::{EngineError, Result};

const GRID_CELLS: usize = 32;
const REFINE_ITERATIONS: usize = 48;
/// Convergence tolerance, relative to the liquidity cap.
const RELATIVE_TOL: f64 = 1e-6;

/// Optimal flashloan size for buying on `buy_pool` and selling on
/// `sell_pool`, maximizing
/// `profit(x) = sell(buy(x)) - x - x * flashloan_fee_pct - gas_cost`
/// over `[0, 0.30 * min(reserves)]`.
///
/// Returns `0.0` when no size in the domain turns a profit; that is a
/// legitimate business outcome, not an error.
pub fn flashloan_amount(
    buy_pool: &PoolState,
    sell_pool: &PoolState,
    flashloan_fee_pct: f64,
    gas_cost: f64,
) -> Result<f64> {
    buy_pool.validate()?;
    sell_pool.validate()?;
    if !flashloan_fee_pct.is_finite() || flashloan_fee_pct < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "flashloan_fee_pct must be finite and non-negative, got {flashloan_fee_pct}"
        )));
    }
    if !gas_cost.is_finite() || gas_cost < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "gas_cost must be finite and non-negative, got {gas_cost}"
        )));
    }

    let cap = liquidity_cap(buy_pool, sell_pool);
    if cap <= 0.0 {
        return Ok(0.0);
    }
    let profit_at =
        |x: f64| round_trip_profit(buy_pool, sell_pool, x, flashloan_fee_pct, gas_cost);

    // Coarse scan to bracket the global peak.
    let cell = cap / GRID_CELLS as f64;
    let mut best_index = 0;
    let mut best_profit = f64::NEG_INFINITY;
    for index in 0..=GRID_CELLS {
        let profit = profit_at(index as f64 * cell)?;
        if profit > best_profit {
            best_profit = profit;
            best_index = index;
        }
    }

    // Golden-section refinement inside the two cells around the best point.
    let mut low = cell * best_index.saturating_sub(1) as f64;
    let mut high = (cell * (best_index + 1) as f64).min(cap);
    let inv_phi = (5.0_f64.sqrt() - 1.0) / 2.0;
    let mut mid_low = high - (high - low) * inv_phi;
    let mut mid_high = low + (high - low) * inv_phi;
    let mut profit_mid_low = profit_at(mid_low)?;
    let mut profit_mid_high = profit_at(mid_high)?;
    for _ in 0..REFINE_ITERATIONS {
        if (high - low) < RELATIVE_TOL * cap {
            break;
        }
        if profit_mid_low > profit_mid_high {
            high = mid_high;
            mid_high = mid_low;
            profit_mid_high = profit_mid_low;
            mid_low = high - (high - low) * inv_phi;
            profit_mid_low = profit_at(mid_low)?;
        } else {
            low = mid_low;
            mid_low = mid_high;
            profit_mid_low = profit_mid_high;
            mid_high = low + (high - low) * inv_phi;
            profit_mid_high = profit_at(mid_high)?;
        }
    }

    let candidate = if profit_mid_low > profit_mid_high {
        mid_low
    } else {
        mid_high
    };
    let (size, profit) = if profit_mid_low.max(profit_mid_high) > best_profit {
        (candidate, profit_mid_low.max(profit_mid_high))
    } else {
        (best_index as f64 * cell, best_profit)
    };

    if profit <= 0.0 {
        tracing::debug!(cap, best_profit = profit, "no profitable flashloan size");
        return Ok(0.0);
    }
    tracing::debug!(size, profit, cap, "flashloan size selected");
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cp(reserve_in: f64, reserve_out: f64) -> PoolState {
        PoolState::ConstantProduct {
            reserve_in,
            reserve_out,
            fee_bps: 30.0,
        }
    }

    /// Buy pool prices the hop asset at 2000, sell pool (already reversed,
    /// asset in -> cash out) pays 2040: a 2% gap.
    fn gapped_pair() -> (PoolState, PoolState) {
        let buy = cp(2_000_000.0, 1_000.0);
        let sell = cp(1_000.0, 2_040_000.0);
        (buy, sell)
    }

    #[test]
    fn finds_profitable_size_in_gap() {
        let (buy, sell) = gapped_pair();
        let size = flashloan_amount(&buy, &sell, 0.0009, 10.0).unwrap();
        assert!(size > 0.0);
        let profit = round_trip_profit(&buy, &sell, size, 0.0009, 10.0).unwrap();
        assert!(profit > 0.0);

        // The returned size should not be obviously beatable nearby.
        for factor in [0.5, 0.9, 1.1, 1.5] {
            let nearby = round_trip_profit(&buy, &sell, size * factor, 0.0009, 10.0).unwrap();
            assert!(profit >= nearby - 1e-6);
        }
    }

    #[test]
    fn exorbitant_gas_kills_the_trade() {
        let (buy, sell) = gapped_pair();
        let size = flashloan_amount(&buy, &sell, 0.0009, 100_000.0).unwrap();
        assert_eq!(size, 0.0);
    }

    #[test]
    fn equal_prices_yield_no_size() {
        let buy = cp(2_000_000.0, 1_000.0);
        let sell = cp(1_000.0, 2_000_000.0);
        let size = flashloan_amount(&buy, &sell, 0.0009, 0.0).unwrap();
        assert_eq!(size, 0.0);
    }

    #[test]
    fn size_respects_liquidity_cap() {
        let (buy, sell) = gapped_pair();
        let cap = liquidity_cap(&buy, &sell);
        let size = flashloan_amount(&buy, &sell, 0.0, 0.0).unwrap();
        assert!(size <= cap);
    }

    #[test]
    fn mixed_curve_legs_still_converge() {
        let buy = PoolState::StableSwap {
            balance_in: 2_000_000.0,
            balance_out: 2_000_000.0,
            amplification: 100.0,
        };
        // Sell leg pays a premium over the stable pool's ~1:1 rate.
        let sell = PoolState::Weighted {
            balance_in: 1_000_000.0,
            balance_out: 1_030_000.0,
            weight_in: 0.5,
            weight_out: 0.5,
        };
        let size = flashloan_amount(&buy, &sell, 0.0009, 1.0).unwrap();
        assert!(size > 0.0);
        let profit = round_trip_profit(&buy, &sell, size, 0.0009, 1.0).unwrap();
        assert!(profit > 0.0);
    }

    #[test]
    fn negative_fee_rejected() {
        let (buy, sell) = gapped_pair();
        assert!(flashloan_amount(&buy, &sell, -0.1, 0.0).is_err());
    }
}
