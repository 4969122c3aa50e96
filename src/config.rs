//! Engine configuration supplied by the caller.

use crate::errors::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Immutable evaluation parameters for one opportunity.
///
/// The engine defines no implicit defaults: every field must be set by the
/// caller's configuration layer. Percent fields (`min_price_diff_pct`,
/// `max_twap_deviation_pct`) are in percent units; `flashloan_fee_pct` is a
/// fractional rate (e.g. `0.0009` for a 9 bps flashloan fee) because it
/// multiplies the borrowed amount directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageConfig {
    /// Fixed gas cost of the round trip, in the same units as trade amounts.
    pub gas_cost: f64,
    /// Flashloan fee as a fraction of the borrowed amount.
    pub flashloan_fee_pct: f64,
    /// Minimum spot-price spread (percent) between the two pools before an
    /// opportunity is considered at all.
    pub min_price_diff_pct: f64,
    /// Maximum deviation (percent) of a pool's spot price from its TWAP
    /// before the opportunity is treated as manipulated.
    pub max_twap_deviation_pct: f64,
    /// Minimum expected profit required to flag the opportunity executable.
    pub min_profit_threshold: f64,
}

impl ArbitrageConfig {
    /// Rejects configurations no evaluation could sensibly run with.
    pub fn validate(&self) -> Result<()> {
        if !self.gas_cost.is_finite() || self.gas_cost < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "gas_cost must be finite and non-negative, got {}",
                self.gas_cost
            )));
        }
        if !self.flashloan_fee_pct.is_finite() || self.flashloan_fee_pct < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "flashloan_fee_pct must be finite and non-negative, got {}",
                self.flashloan_fee_pct
            )));
        }
        if !self.min_price_diff_pct.is_finite() || self.min_price_diff_pct < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "min_price_diff_pct must be finite and non-negative, got {}",
                self.min_price_diff_pct
            )));
        }
        if !self.max_twap_deviation_pct.is_finite() || self.max_twap_deviation_pct < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "max_twap_deviation_pct must be finite and non-negative, got {}",
                self.max_twap_deviation_pct
            )));
        }
        if !self.min_profit_threshold.is_finite() {
            return Err(EngineError::InvalidInput(format!(
                "min_profit_threshold must be finite, got {}",
                self.min_profit_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ArbitrageConfig {
        ArbitrageConfig {
            gas_cost: 10.0,
            flashloan_fee_pct: 0.0009,
            min_price_diff_pct: 0.5,
            max_twap_deviation_pct: 2.0,
            min_profit_threshold: 1.0,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn negative_fee_rejected() {
        let mut config = base_config();
        config.flashloan_fee_pct = -0.01;
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_finite_gas_rejected() {
        let mut config = base_config();
        config.gas_cost = f64::NAN;
        assert!(config.validate().is_err());
    }
}
