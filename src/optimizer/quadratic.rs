//! Closed-form trade sizing via a local quadratic profit model.

use super::{liquidity_cap, round_trip_profit};
use crate::amm::{self, PoolState};
use crate::errors::{EngineError, Result};

/// Real roots of `a*x^2 + b*x + c = 0`.
///
/// An empty root set is a normal outcome (the parabola never crosses
/// zero), not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuadraticRoots {
    /// Two distinct real roots, larger first.
    Two(f64, f64),
    /// Repeated root (discriminant zero), or the single root of the
    /// degenerate linear case `a == 0, b != 0`.
    One(f64),
    /// Negative discriminant, or no solution at all.
    None,
}

/// Solve the quadratic via the discriminant `b^2 - 4ac`.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> QuadraticRoots {
    if a == 0.0 {
        if b == 0.0 {
            return QuadraticRoots::None;
        }
        return QuadraticRoots::One(-c / b);
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return QuadraticRoots::None;
    }
    if discriminant == 0.0 {
        return QuadraticRoots::One(-b / (2.0 * a));
    }
    let sqrt_disc = discriminant.sqrt();
    let first = (-b + sqrt_disc) / (2.0 * a);
    let second = (-b - sqrt_disc) / (2.0 * a);
    QuadraticRoots::Two(first.max(second), first.min(second))
}

/// Trade size from a local quadratic approximation of the round-trip
/// profit curve.
///
/// The exact profit is sampled at `{0, cap/2, cap}` and fitted with
/// `profit(x) ~ a*x^2 + b*x + c`. For a concave fit (`a < 0`) the vertex is
/// recovered as the midpoint of the parabola's roots; a root-free concave
/// parabola never breaks even, so the answer is `0.0`. A non-concave fit
/// has no interior maximum under the model and falls back to the better
/// boundary of the feasible interval. The chosen size is re-checked against
/// the exact profit curve; `0.0` means no profitable size.
pub fn optimize_trade_size_quadratic(
    buy_pool: &PoolState,
    sell_pool: &PoolState,
    gas_cost: f64,
    flashloan_fee_pct: f64,
) -> Result<f64> {
    buy_pool.validate()?;
    sell_pool.validate()?;
    if !gas_cost.is_finite() || gas_cost < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "gas_cost must be finite and non-negative, got {gas_cost}"
        )));
    }
    if !flashloan_fee_pct.is_finite() || flashloan_fee_pct < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "flashloan_fee_pct must be finite and non-negative, got {flashloan_fee_pct}"
        )));
    }

    let cap = liquidity_cap(buy_pool, sell_pool);
    if cap <= 0.0 {
        return Ok(0.0);
    }
    let profit_at =
        |x: f64| round_trip_profit(buy_pool, sell_pool, x, flashloan_fee_pct, gas_cost);

    // Three-point fit over {0, h, 2h} with h = cap / 2.
    let h = cap / 2.0;
    let p0 = profit_at(0.0)?;
    let p1 = profit_at(h)?;
    let p2 = profit_at(cap)?;
    let a = (p2 - 2.0 * p1 + p0) / (2.0 * h * h);
    let b = (4.0 * p1 - 3.0 * p0 - p2) / (2.0 * h);
    let c = p0;

    let candidate = if a < 0.0 {
        match solve_quadratic(a, b, c) {
            // Vertex of a parabola is the midpoint of its roots.
            QuadraticRoots::Two(high, low) => (high + low) / 2.0,
            // Touching zero at one point means the peak profit is zero.
            QuadraticRoots::One(_) | QuadraticRoots::None => {
                tracing::debug!(a, b, c, "quadratic model never breaks even");
                return Ok(0.0);
            }
        }
    } else {
        // No finite interior maximum under the model.
        if p2 > p0 { cap } else { 0.0 }
    };

    let size = candidate.clamp(0.0, cap);
    if size <= 0.0 || profit_at(size)? <= 0.0 {
        return Ok(0.0);
    }
    Ok(size)
}

const SINGLE_LEG_DOMAIN_FRACTION: f64 = 0.1;
const SINGLE_LEG_ITERATIONS: usize = 50;
const SINGLE_LEG_TOL: f64 = 1e-4;

/// Largest single-leg trade whose profit `out - x - gas_cost` still clears
/// `min_profit`, found by bounded binary search over
/// `[0, 0.1 * in-side depth]`. Returns `0.0` when no feasible size exists.
pub fn optimal_trade_size(pool: &PoolState, gas_cost: f64, min_profit: f64) -> Result<f64> {
    pool.validate()?;
    if !gas_cost.is_finite() || gas_cost < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "gas_cost must be finite and non-negative, got {gas_cost}"
        )));
    }
    if !min_profit.is_finite() {
        return Err(EngineError::InvalidInput(format!(
            "min_profit must be finite, got {min_profit}"
        )));
    }

    let (depth_in, _) = pool.effective_reserves();
    let mut low = 0.0;
    let mut high = depth_in * SINGLE_LEG_DOMAIN_FRACTION;
    let mut best_size = 0.0;
    for _ in 0..SINGLE_LEG_ITERATIONS {
        let mid = (low + high) / 2.0;
        let profit = amm::amount_out(pool, mid)? - mid - gas_cost;
        if profit >= min_profit {
            best_size = mid;
            low = mid;
        } else {
            high = mid;
        }
        if (high - low) < SINGLE_LEG_TOL {
            break;
        }
    }
    Ok(best_size)
}
