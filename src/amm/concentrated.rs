//! Concentrated-liquidity pricing via current-tick virtual reserves.
//!
//! A V3-style pool inside one tick behaves exactly like a constant-product
//! pool over the virtual reserves `(L / sqrt_price, L * sqrt_price)`, so we
//! derive those and reuse the fee-free constant-product formula. Trades
//! large enough to cross a tick boundary are mispriced by this model; the
//! surrounding liquidity caps keep sizes well inside the tick in practice.

use super::constant_product;
use crate::errors::Result;

/// Virtual `(in, out)` reserves implied by the current tick.
pub(crate) fn virtual_reserves(liquidity: f64, sqrt_price: f64) -> (f64, f64) {
    (liquidity / sqrt_price, liquidity * sqrt_price)
}

pub(crate) fn amount_out(liquidity: f64, sqrt_price: f64, amount_in: f64) -> Result<f64> {
    let (vr_in, vr_out) = virtual_reserves(liquidity, sqrt_price);
    constant_product::amount_out(vr_in, vr_out, 0.0, amount_in)
}
