//! Constant-product (`x * y = k`) swap math.

use crate::errors::{EngineError, Result};

/// Output for a fixed input, fee taken on the input side.
///
/// `amount_out = reserve_out * amount_in_eff / (reserve_in + amount_in_eff)`
/// with `amount_in_eff = amount_in * (1 - fee)`. Output saturates strictly
/// below `reserve_out` for any finite input.
pub(crate) fn amount_out(
    reserve_in: f64,
    reserve_out: f64,
    fee_bps: f64,
    amount_in: f64,
) -> Result<f64> {
    let amount_in_eff = amount_in * (1.0 - fee_bps / 10_000.0);
    let denominator = reserve_in + amount_in_eff;
    if denominator <= 0.0 {
        return Err(EngineError::NumericDegenerate(format!(
            "constant-product denominator collapsed: reserve_in={reserve_in} amount_in_eff={amount_in_eff}"
        )));
    }
    Ok(reserve_out * amount_in_eff / denominator)
}

/// Algebraic inverse of [`amount_out`]: the input required for a fixed
/// output. Caller guarantees `amount_out < reserve_out`.
pub(crate) fn amount_in(
    reserve_in: f64,
    reserve_out: f64,
    fee_bps: f64,
    amount_out: f64,
) -> Result<f64> {
    let remaining = reserve_out - amount_out;
    if remaining <= 0.0 {
        return Err(EngineError::NumericDegenerate(format!(
            "out-side reserve exhausted: reserve_out={reserve_out} amount_out={amount_out}"
        )));
    }
    let amount_in_eff = amount_out * reserve_in / remaining;
    Ok(amount_in_eff / (1.0 - fee_bps / 10_000.0))
}
