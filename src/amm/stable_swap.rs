//! Two-coin StableSwap invariant math.
//!
//! Swaps are priced by solving the Curve invariant
//! `A*n^n*S + D = A*n^n*D + D^(n+1) / (n^n * prod(balances))`
//! for `D`, then for the post-trade out-side balance `y`. Both solves use
//! Newton-Raphson with a hard iteration cap so degenerate snapshots cannot
//! loop forever.

use crate::errors::{EngineError, Result};

const N_COINS: f64 = 2.0;
const MAX_ITERATIONS: usize = 255;
const CONVERGENCE_TOL: f64 = 1e-10;

/// Solve the invariant `D` for the current balances.
fn solve_d(balance_in: f64, balance_out: f64, amplification: f64) -> Result<f64> {
    let s = balance_in + balance_out;
    let ann = amplification * N_COINS * N_COINS;
    let mut d = s;
    for _ in 0..MAX_ITERATIONS {
        // d_p = d^(n+1) / (n^n * prod(balances)), written out for n = 2.
        let d_p = d * d * d / (N_COINS * N_COINS * balance_in * balance_out);
        let d_next = (ann * s + d_p * N_COINS) * d / ((ann - 1.0) * d + (N_COINS + 1.0) * d_p);
        if !d_next.is_finite() {
            return Err(EngineError::NumericDegenerate(format!(
                "StableSwap D solve diverged for balances ({balance_in}, {balance_out}), A={amplification}"
            )));
        }
        if ((d_next - d) / d).abs() < CONVERGENCE_TOL {
            return Ok(d_next);
        }
        d = d_next;
    }
    Err(EngineError::NumericDegenerate(format!(
        "StableSwap D solve did not converge within {MAX_ITERATIONS} iterations"
    )))
}

/// Solve the out-side balance `y` given the new in-side balance `x` and a
/// fixed invariant `D`.
fn solve_y(x: f64, d: f64, amplification: f64) -> Result<f64> {
    if x <= 0.0 {
        return Err(EngineError::NumericDegenerate(format!(
            "StableSwap y solve requires positive in-side balance, got {x}"
        )));
    }
    let ann = amplification * N_COINS * N_COINS;
    let c = d * d * d / (N_COINS * N_COINS * x * ann);
    let b = x + d / ann;
    let mut y = d;
    for _ in 0..MAX_ITERATIONS {
        let y_next = (y * y + c) / (2.0 * y + b - d);
        if !y_next.is_finite() {
            return Err(EngineError::NumericDegenerate(
                "StableSwap y solve diverged".to_string(),
            ));
        }
        if ((y_next - y) / d).abs() < CONVERGENCE_TOL {
            return Ok(y_next);
        }
        y = y_next;
    }
    Err(EngineError::NumericDegenerate(format!(
        "StableSwap y solve did not converge within {MAX_ITERATIONS} iterations"
    )))
}

pub(crate) fn amount_out(
    balance_in: f64,
    balance_out: f64,
    amplification: f64,
    amount_in: f64,
) -> Result<f64> {
    let d = solve_d(balance_in, balance_out, amplification)?;
    let y_new = solve_y(balance_in + amount_in, d, amplification)?;
    Ok((balance_out - y_new).max(0.0))
}

pub(crate) fn amount_in(
    balance_in: f64,
    balance_out: f64,
    amplification: f64,
    amount_out: f64,
) -> Result<f64> {
    // Symmetric to amount_out: fix the invariant, shrink the out side to
    // its target, and solve for the in-side balance that keeps D constant.
    let d = solve_d(balance_in, balance_out, amplification)?;
    let x_new = solve_y(balance_out - amount_out, d, amplification)?;
    Ok((x_new - balance_in).max(0.0))
}

/// Marginal price from an infinitesimal probe against the invariant.
///
/// The closed-form derivative of the two-coin invariant is unwieldy; a
/// relative probe of 1e-7 of the in-side balance prices the mid within
/// float noise at StableSwap curvatures.
pub(crate) fn spot_price(balance_in: f64, balance_out: f64, amplification: f64) -> Result<f64> {
    let probe = balance_in * 1e-7;
    let out = amount_out(balance_in, balance_out, amplification, probe)?;
    if probe <= 0.0 {
        return Err(EngineError::NumericDegenerate(
            "StableSwap spot probe collapsed to zero".to_string(),
        ));
    }
    Ok(out / probe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_pool_trades_near_parity() {
        let out = amount_out(1_000_000.0, 1_000_000.0, 100.0, 10_000.0).unwrap();
        // A=100 keeps a balanced pool within a few bps of 1:1.
        assert!(out > 9_990.0 && out < 10_000.0, "out = {out}");
    }

    #[test]
    fn higher_amplification_flattens_the_curve() {
        let trade = 100_000.0;
        let mut previous_out = 0.0;
        for amplification in [1.0, 10.0, 100.0, 1000.0] {
            let out = amount_out(1_000_000.0, 1_000_000.0, amplification, trade).unwrap();
            assert!(
                out > previous_out,
                "output did not improve at A={amplification}"
            );
            previous_out = out;
        }
    }

    #[test]
    fn invariant_preserved_across_trade() {
        let (balance_in, balance_out, amplification) = (2_000_000.0, 1_500_000.0, 200.0);
        let d_before = solve_d(balance_in, balance_out, amplification).unwrap();
        let trade = 50_000.0;
        let out = amount_out(balance_in, balance_out, amplification, trade).unwrap();
        let d_after = solve_d(balance_in + trade, balance_out - out, amplification).unwrap();
        assert!(((d_after - d_before) / d_before).abs() < 1e-6);
    }

    #[test]
    fn inverse_quote_consistent_with_forward() {
        let (balance_in, balance_out, amplification) = (1_000_000.0, 1_000_000.0, 50.0);
        let out = amount_out(balance_in, balance_out, amplification, 25_000.0).unwrap();
        let back = amount_in(balance_in, balance_out, amplification, out).unwrap();
        assert!((back - 25_000.0).abs() / 25_000.0 < 1e-6);
    }

    #[test]
    fn balanced_spot_is_near_one() {
        let spot = spot_price(1_000_000.0, 1_000_000.0, 100.0).unwrap();
        assert!((spot - 1.0).abs() < 1e-3, "spot = {spot}");
    }
}
