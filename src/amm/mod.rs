//! Per-protocol AMM pricing models.
//!
//! Every swap formula here is a floating-point decision-support
//! approximation: good enough to size and rank trades, never a substitute
//! for the exact integer arithmetic of the on-chain execution layer.

use crate::errors::{EngineError, Result};
use serde::{Deserialize, Serialize};

pub mod concentrated;
pub mod constant_product;
pub mod stable_swap;
pub mod weighted;

/// Immutable snapshot of one directional pool, polymorphic over curve type.
///
/// `reserve_in`/`balance_in` always refers to the token the trade pushes
/// in, `reserve_out`/`balance_out` to the token it takes out. Swapping the
/// other way round goes through [`PoolState::reversed`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoolState {
    /// Uniswap V2 style `x * y = k` pool with an LP fee in basis points.
    ConstantProduct {
        reserve_in: f64,
        reserve_out: f64,
        fee_bps: f64,
    },
    /// Uniswap V3 style pool reduced to its current-tick virtual reserves.
    /// Single-tick approximation only; tick crossing is not modeled.
    ConcentratedLiquidity { liquidity: f64, sqrt_price: f64 },
    /// Curve style two-coin pool driven by the StableSwap invariant.
    StableSwap {
        balance_in: f64,
        balance_out: f64,
        amplification: f64,
    },
    /// Balancer style weighted constant-product pool. Weights need only be
    /// pairwise positive; they do not have to sum to one.
    Weighted {
        balance_in: f64,
        balance_out: f64,
        weight_in: f64,
        weight_out: f64,
    },
}

impl PoolState {
    /// Structural validation of the snapshot itself, independent of any
    /// trade amount.
    pub fn validate(&self) -> Result<()> {
        let bad = |what: &str, value: f64| {
            Err(EngineError::InvalidInput(format!(
                "{what} must be finite and positive, got {value}"
            )))
        };
        match *self {
            PoolState::ConstantProduct {
                reserve_in,
                reserve_out,
                fee_bps,
            } => {
                if !reserve_in.is_finite() || reserve_in <= 0.0 {
                    return bad("reserve_in", reserve_in);
                }
                if !reserve_out.is_finite() || reserve_out <= 0.0 {
                    return bad("reserve_out", reserve_out);
                }
                if !fee_bps.is_finite() || !(0.0..10_000.0).contains(&fee_bps) {
                    return Err(EngineError::InvalidInput(format!(
                        "fee_bps must be in [0, 10000), got {fee_bps}"
                    )));
                }
            }
            PoolState::ConcentratedLiquidity {
                liquidity,
                sqrt_price,
            } => {
                if !liquidity.is_finite() || liquidity <= 0.0 {
                    return bad("liquidity", liquidity);
                }
                if !sqrt_price.is_finite() || sqrt_price <= 0.0 {
                    return bad("sqrt_price", sqrt_price);
                }
            }
            PoolState::StableSwap {
                balance_in,
                balance_out,
                amplification,
            } => {
                if !balance_in.is_finite() || balance_in <= 0.0 {
                    return bad("balance_in", balance_in);
                }
                if !balance_out.is_finite() || balance_out <= 0.0 {
                    return bad("balance_out", balance_out);
                }
                if !amplification.is_finite() || amplification <= 0.0 {
                    return bad("amplification", amplification);
                }
            }
            PoolState::Weighted {
                balance_in,
                balance_out,
                weight_in,
                weight_out,
            } => {
                if !balance_in.is_finite() || balance_in <= 0.0 {
                    return bad("balance_in", balance_in);
                }
                if !balance_out.is_finite() || balance_out <= 0.0 {
                    return bad("balance_out", balance_out);
                }
                if !weight_in.is_finite() || weight_in <= 0.0 {
                    return bad("weight_in", weight_in);
                }
                if !weight_out.is_finite() || weight_out <= 0.0 {
                    return bad("weight_out", weight_out);
                }
            }
        }
        Ok(())
    }

    /// Marginal (infinitesimal-trade) price of the out-token per in-token.
    pub fn spot_price(&self) -> Result<f64> {
        self.validate()?;
        match *self {
            PoolState::ConstantProduct {
                reserve_in,
                reserve_out,
                ..
            } => Ok(reserve_out / reserve_in),
            PoolState::ConcentratedLiquidity { sqrt_price, .. } => Ok(sqrt_price * sqrt_price),
            PoolState::StableSwap {
                balance_in,
                balance_out,
                amplification,
            } => stable_swap::spot_price(balance_in, balance_out, amplification),
            PoolState::Weighted {
                balance_in,
                balance_out,
                weight_in,
                weight_out,
            } => Ok((balance_out / weight_out) / (balance_in / weight_in)),
        }
    }

    /// Effective (in, out) depth used for liquidity caps: raw reserves for
    /// reserve-style pools, virtual reserves for concentrated liquidity.
    pub fn effective_reserves(&self) -> (f64, f64) {
        match *self {
            PoolState::ConstantProduct {
                reserve_in,
                reserve_out,
                ..
            } => (reserve_in, reserve_out),
            PoolState::ConcentratedLiquidity {
                liquidity,
                sqrt_price,
            } => concentrated::virtual_reserves(liquidity, sqrt_price),
            PoolState::StableSwap {
                balance_in,
                balance_out,
                ..
            } => (balance_in, balance_out),
            PoolState::Weighted {
                balance_in,
                balance_out,
                ..
            } => (balance_in, balance_out),
        }
    }

    /// The same pool quoted in the opposite direction.
    pub fn reversed(&self) -> PoolState {
        match *self {
            PoolState::ConstantProduct {
                reserve_in,
                reserve_out,
                fee_bps,
            } => PoolState::ConstantProduct {
                reserve_in: reserve_out,
                reserve_out: reserve_in,
                fee_bps,
            },
            PoolState::ConcentratedLiquidity {
                liquidity,
                sqrt_price,
            } => PoolState::ConcentratedLiquidity {
                liquidity,
                sqrt_price: 1.0 / sqrt_price,
            },
            PoolState::StableSwap {
                balance_in,
                balance_out,
                amplification,
            } => PoolState::StableSwap {
                balance_in: balance_out,
                balance_out: balance_in,
                amplification,
            },
            PoolState::Weighted {
                balance_in,
                balance_out,
                weight_in,
                weight_out,
            } => PoolState::Weighted {
                balance_in: balance_out,
                balance_out: balance_in,
                weight_in: weight_out,
                weight_out: weight_in,
            },
        }
    }

    /// Snapshot of the pool after executing a trade of `amount_in` for
    /// `amount_out` against it. Used to measure market impact.
    pub(crate) fn after_trade(&self, amount_in: f64, amount_out: f64) -> PoolState {
        match *self {
            PoolState::ConstantProduct {
                reserve_in,
                reserve_out,
                fee_bps,
            } => PoolState::ConstantProduct {
                reserve_in: reserve_in + amount_in,
                reserve_out: reserve_out - amount_out,
                fee_bps,
            },
            PoolState::ConcentratedLiquidity {
                liquidity,
                sqrt_price,
            } => {
                // Fee-free swap on virtual reserves keeps vr_in * vr_out = L^2,
                // so the post-trade sqrt price is just vr_out' / L.
                let (_, vr_out) = concentrated::virtual_reserves(liquidity, sqrt_price);
                PoolState::ConcentratedLiquidity {
                    liquidity,
                    sqrt_price: (vr_out - amount_out) / liquidity,
                }
            }
            PoolState::StableSwap {
                balance_in,
                balance_out,
                amplification,
            } => PoolState::StableSwap {
                balance_in: balance_in + amount_in,
                balance_out: balance_out - amount_out,
                amplification,
            },
            PoolState::Weighted {
                balance_in,
                balance_out,
                weight_in,
                weight_out,
            } => PoolState::Weighted {
                balance_in: balance_in + amount_in,
                balance_out: balance_out - amount_out,
                weight_in,
                weight_out,
            },
        }
    }
}

/// Quote the output amount for a fixed input, per curve type.
pub fn amount_out(pool: &PoolState, amount_in: f64) -> Result<f64> {
    pool.validate()?;
    if !amount_in.is_finite() || amount_in < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "amount_in must be finite and non-negative, got {amount_in}"
        )));
    }
    if amount_in == 0.0 {
        return Ok(0.0);
    }
    match *pool {
        PoolState::ConstantProduct {
            reserve_in,
            reserve_out,
            fee_bps,
        } => constant_product::amount_out(reserve_in, reserve_out, fee_bps, amount_in),
        PoolState::ConcentratedLiquidity {
            liquidity,
            sqrt_price,
        } => concentrated::amount_out(liquidity, sqrt_price, amount_in),
        PoolState::StableSwap {
            balance_in,
            balance_out,
            amplification,
        } => stable_swap::amount_out(balance_in, balance_out, amplification, amount_in),
        PoolState::Weighted {
            balance_in,
            balance_out,
            weight_in,
            weight_out,
        } => weighted::amount_out(balance_in, balance_out, weight_in, weight_out, amount_in),
    }
}

/// Quote the input required to receive at least `amount_out`.
///
/// Algebraic inverse of [`amount_out`] with a one-sided rounding guard, so
/// the quoted input never under-delivers. Fails with `InvalidInput` when
/// `amount_out` meets or exceeds the out-side depth (no finite input could
/// produce it).
pub fn amount_in(pool: &PoolState, amount_out: f64) -> Result<f64> {
    pool.validate()?;
    if !amount_out.is_finite() || amount_out < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "amount_out must be finite and non-negative, got {amount_out}"
        )));
    }
    if amount_out == 0.0 {
        return Ok(0.0);
    }
    let (_, depth_out) = pool.effective_reserves();
    if amount_out >= depth_out {
        return Err(EngineError::InvalidInput(format!(
            "amount_out {amount_out} cannot be satisfied from out-side depth {depth_out}"
        )));
    }
    let gross = match *pool {
        PoolState::ConstantProduct {
            reserve_in,
            reserve_out,
            fee_bps,
        } => constant_product::amount_in(reserve_in, reserve_out, fee_bps, amount_out)?,
        PoolState::ConcentratedLiquidity {
            liquidity,
            sqrt_price,
        } => {
            let (vr_in, vr_out) = concentrated::virtual_reserves(liquidity, sqrt_price);
            constant_product::amount_in(vr_in, vr_out, 0.0, amount_out)?
        }
        PoolState::StableSwap {
            balance_in,
            balance_out,
            amplification,
        } => stable_swap::amount_in(balance_in, balance_out, amplification, amount_out)?,
        PoolState::Weighted {
            balance_in,
            balance_out,
            weight_in,
            weight_out,
        } => weighted::amount_in(balance_in, balance_out, weight_in, weight_out, amount_out)?,
    };
    // Round the quote up by a hair so float error can never make the
    // returned input insufficient for the requested output.
    Ok(gross * (1.0 + ROUND_UP_EPS))
}

const ROUND_UP_EPS: f64 = 1e-12;

#[cfg(test)]
mod tests {
    use super::*;

    fn cp(reserve_in: f64, reserve_out: f64, fee_bps: f64) -> PoolState {
        PoolState::ConstantProduct {
            reserve_in,
            reserve_out,
            fee_bps,
        }
    }

    #[test]
    fn spot_price_exact_values() {
        let pool = cp(1_000_000.0, 2_000_000.0, 30.0);
        assert_eq!(pool.spot_price().unwrap(), 2.0);
        let pool = cp(1000.0, 1000.0, 30.0);
        assert_eq!(pool.spot_price().unwrap(), 1.0);
    }

    #[test]
    fn amount_out_monotone_and_bounded() {
        let pool = cp(1_000_000.0, 2_000_000.0, 30.0);
        let mut previous = 0.0;
        for step in 1..=100 {
            let amount_in = step as f64 * 50_000.0;
            let out = amount_out(&pool, amount_in).unwrap();
            assert!(out >= previous, "amount_out not non-decreasing at {amount_in}");
            assert!(out < 2_000_000.0, "amount_out reached reserve_out");
            previous = out;
        }
    }

    #[test]
    fn amount_in_covers_round_trip() {
        let pool = cp(1_000_000.0, 2_000_000.0, 30.0);
        for x in [1.0, 500.0, 10_000.0, 250_000.0] {
            let out = amount_out(&pool, x).unwrap();
            let required = amount_in(&pool, out).unwrap();
            assert!(
                required >= x,
                "inverse quote {required} under-delivers original input {x}"
            );
        }
    }

    #[test]
    fn amount_in_rejects_unreachable_output() {
        let pool = cp(1_000_000.0, 2_000_000.0, 30.0);
        assert!(matches!(
            amount_in(&pool, 2_000_000.0),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn negative_amount_rejected() {
        let pool = cp(1_000_000.0, 2_000_000.0, 30.0);
        assert!(matches!(
            amount_out(&pool, -1.0),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn zero_reserves_rejected() {
        let pool = cp(0.0, 2_000_000.0, 30.0);
        assert!(matches!(
            amount_out(&pool, 100.0),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn concentrated_matches_virtual_constant_product() {
        let liquidity = 1_000_000.0;
        let sqrt_price = 1.5;
        let pool = PoolState::ConcentratedLiquidity {
            liquidity,
            sqrt_price,
        };
        let virtual_pool = cp(liquidity / sqrt_price, liquidity * sqrt_price, 0.0);
        let out_cl = amount_out(&pool, 10_000.0).unwrap();
        let out_cp = amount_out(&virtual_pool, 10_000.0).unwrap();
        assert!((out_cl - out_cp).abs() < 1e-9);
        assert!((pool.spot_price().unwrap() - 2.25).abs() < 1e-12);
    }

    #[test]
    fn reversed_round_trips_orientation() {
        let pool = cp(1_000.0, 4_000.0, 30.0);
        let back = pool.reversed().reversed();
        assert_eq!(pool, back);

        let cl = PoolState::ConcentratedLiquidity {
            liquidity: 500_000.0,
            sqrt_price: 2.0,
        };
        let spot = cl.spot_price().unwrap();
        let reversed_spot = cl.reversed().spot_price().unwrap();
        assert!((spot * reversed_spot - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pool_snapshot_deserializes_from_collaborator_json() {
        let raw = r#"{
            "kind": "constant_product",
            "reserve_in": 1000000.0,
            "reserve_out": 2000000.0,
            "fee_bps": 30.0
        }"#;
        let pool: PoolState = serde_json::from_str(raw).unwrap();
        assert_eq!(pool, cp(1_000_000.0, 2_000_000.0, 30.0));
    }
}
