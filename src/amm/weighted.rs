//! Balancer-style weighted constant-product math.
//!
//! Swap formula:
//! `amount_out = balance_out * (1 - (balance_in / (balance_in + amount_in))^(weight_in / weight_out))`

use crate::errors::{EngineError, Result};

pub(crate) fn amount_out(
    balance_in: f64,
    balance_out: f64,
    weight_in: f64,
    weight_out: f64,
    amount_in: f64,
) -> Result<f64> {
    let base = balance_in / (balance_in + amount_in);
    let exponent = weight_in / weight_out;
    let out = balance_out * (1.0 - base.powf(exponent));
    if !out.is_finite() {
        return Err(EngineError::NumericDegenerate(format!(
            "weighted swap produced non-finite output for amount_in={amount_in}"
        )));
    }
    Ok(out)
}

/// Inverse quote: `amount_in = balance_in * ((balance_out / (balance_out - amount_out))^(weight_out / weight_in) - 1)`.
/// Caller guarantees `amount_out < balance_out`.
pub(crate) fn amount_in(
    balance_in: f64,
    balance_out: f64,
    weight_in: f64,
    weight_out: f64,
    amount_out: f64,
) -> Result<f64> {
    let remaining = balance_out - amount_out;
    if remaining <= 0.0 {
        return Err(EngineError::NumericDegenerate(format!(
            "weighted out-side balance exhausted: balance_out={balance_out} amount_out={amount_out}"
        )));
    }
    let ratio = balance_out / remaining;
    let exponent = weight_out / weight_in;
    let quoted = balance_in * (ratio.powf(exponent) - 1.0);
    if !quoted.is_finite() {
        return Err(EngineError::NumericDegenerate(format!(
            "weighted inverse quote diverged for amount_out={amount_out}"
        )));
    }
    Ok(quoted)
}
