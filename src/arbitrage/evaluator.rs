//! Gated evaluation of a two-pool arbitrage opportunity.
//!
//! The pipeline is a short-circuit chain: spread check, TWAP manipulation
//! check on both pools, flashloan sizing, profit threshold. The first gate
//! that fails ends the evaluation with `should_execute == false` and
//! whatever partial numbers were computed up to that point. Only invalid
//! inputs are errors; an unattractive opportunity is a normal outcome.

use crate::amm::PoolState;
use crate::config::ArbitrageConfig;
use crate::errors::Result;
use crate::models::{OpportunityEvaluation, PriceSample, TradeDirection};
use crate::optimizer::{self, flashloan_amount};
use crate::twap::{twap, validate_with_twap};

/// Spread check between two pools quoting the same pair in the same
/// orientation.
///
/// Returns `(is_wide_enough, spread_pct, direction)` where the spread is
/// the absolute spot difference relative to the cheaper quote, in percent,
/// and the direction names the pool with the higher spot price. The hop
/// asset is cheaper on that pool, so the round trip buys there and sells
/// through the other pool reversed.
pub fn identify_opportunity(
    pool1: &PoolState,
    pool2: &PoolState,
    min_price_diff_pct: f64,
) -> Result<(bool, f64, TradeDirection)> {
    let price1 = pool1.spot_price()?;
    let price2 = pool2.spot_price()?;
    let spread_pct = (price1 - price2).abs() / price1.min(price2) * 100.0;
    let direction = if price1 > price2 {
        TradeDirection::BuyPool1
    } else {
        TradeDirection::BuyPool2
    };
    Ok((spread_pct > min_price_diff_pct, spread_pct, direction))
}

/// Full evaluation of one opportunity against a configuration.
///
/// `series1` and `series2` are the recent price histories of the two pools,
/// used only for the TWAP manipulation gate.
pub fn evaluate_opportunity(
    pool1: &PoolState,
    pool2: &PoolState,
    series1: &[PriceSample],
    series2: &[PriceSample],
    config: &ArbitrageConfig,
) -> Result<OpportunityEvaluation> {
    config.validate()?;
    pool1.validate()?;
    pool2.validate()?;

    let rejected = |optimal_amount: f64, expected_profit: f64| OpportunityEvaluation {
        should_execute: false,
        optimal_amount,
        expected_profit,
    };

    let (wide_enough, spread_pct, direction) =
        identify_opportunity(pool1, pool2, config.min_price_diff_pct)?;
    if !wide_enough {
        tracing::debug!(spread_pct, "spread below threshold");
        return Ok(rejected(0.0, 0.0));
    }

    let twap1 = twap(series1, None)?;
    let twap2 = twap(series2, None)?;
    let spot1_ok = validate_with_twap(pool1.spot_price()?, twap1, config.max_twap_deviation_pct);
    let spot2_ok = validate_with_twap(pool2.spot_price()?, twap2, config.max_twap_deviation_pct);
    if !spot1_ok || !spot2_ok {
        tracing::debug!(twap1, twap2, spot1_ok, spot2_ok, "spot deviates from TWAP");
        return Ok(rejected(0.0, 0.0));
    }

    let (buy_pool, sell_pool) = match direction {
        TradeDirection::BuyPool1 => (*pool1, pool2.reversed()),
        TradeDirection::BuyPool2 => (*pool2, pool1.reversed()),
    };
    let optimal_amount = flashloan_amount(
        &buy_pool,
        &sell_pool,
        config.flashloan_fee_pct,
        config.gas_cost,
    )?;
    if optimal_amount <= 0.0 {
        tracing::debug!(spread_pct, "no profitable flashloan size");
        return Ok(rejected(0.0, 0.0));
    }

    let expected_profit = optimizer::round_trip_profit(
        &buy_pool,
        &sell_pool,
        optimal_amount,
        config.flashloan_fee_pct,
        config.gas_cost,
    )?;
    if expected_profit < config.min_profit_threshold {
        tracing::debug!(expected_profit, "profit below execution threshold");
        return Ok(rejected(optimal_amount, expected_profit));
    }

    tracing::debug!(
        ?direction,
        optimal_amount,
        expected_profit,
        "opportunity cleared all gates"
    );
    Ok(OpportunityEvaluation {
        should_execute: true,
        optimal_amount,
        expected_profit,
    })
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

    fn flat_series(price: f64) -> Vec<PriceSample> {
        (0..4)
            .map(|index| PriceSample {
                timestamp: index as f64 * 10.0,
                price,
            })
            .collect()
    }

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
    fn spread_measured_against_cheaper_pool() {
        // Spots 2.0 and 1.5: spread is 0.5 / 1.5 = 33.33%.
        let pool1 = cp(1_000_000.0, 2_000_000.0);
        let pool2 = cp(1_000_000.0, 1_500_000.0);
        let (wide, spread, direction) = identify_opportunity(&pool1, &pool2, 5.0).unwrap();
        assert!(wide);
        assert!((spread - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(direction, TradeDirection::BuyPool1);
    }

    #[test]
    fn spread_threshold_is_strict() {
        let pool1 = cp(1_000_000.0, 2_000_000.0);
        let pool2 = cp(1_000_000.0, 1_500_000.0);
        let (wide, spread, _) = identify_opportunity(&pool1, &pool2, 40.0).unwrap();
        assert!(!wide);
        let (at_threshold, _, _) = identify_opportunity(&pool1, &pool2, spread).unwrap();
        assert!(!at_threshold);
    }

    #[test]
    fn direction_flips_with_pool_order() {
        let pool1 = cp(1_000_000.0, 1_500_000.0);
        let pool2 = cp(1_000_000.0, 2_000_000.0);
        let (_, _, direction) = identify_opportunity(&pool1, &pool2, 0.5).unwrap();
        assert_eq!(direction, TradeDirection::BuyPool2);
    }

    #[test]
    fn clean_opportunity_clears_every_gate() {
        let pool1 = cp(1_000_000.0, 2_000_000.0);
        let pool2 = cp(1_000_000.0, 1_500_000.0);
        let evaluation = evaluate_opportunity(
            &pool1,
            &pool2,
            &flat_series(2.0),
            &flat_series(1.5),
            &base_config(),
        )
        .unwrap();
        assert!(evaluation.should_execute);
        assert!(evaluation.optimal_amount > 0.0);
        assert!(evaluation.expected_profit >= 1.0);
    }

    #[test]
    fn narrow_spread_stops_at_first_gate() {
        let pool1 = cp(1_000_000.0, 2_000_000.0);
        let pool2 = cp(1_000_000.0, 1_999_000.0);
        let evaluation = evaluate_opportunity(
            &pool1,
            &pool2,
            &flat_series(2.0),
            &flat_series(1.999),
            &base_config(),
        )
        .unwrap();
        assert!(!evaluation.should_execute);
        assert_eq!(evaluation.optimal_amount, 0.0);
        assert_eq!(evaluation.expected_profit, 0.0);
    }

    #[test]
    fn manipulated_spot_fails_twap_gate() {
        let pool1 = cp(1_000_000.0, 2_000_000.0);
        let pool2 = cp(1_000_000.0, 1_500_000.0);
        // History says pool1 normally trades at 1.5; its current 2.0 spot
        // deviates 33%, far past the 2% tolerance.
        let evaluation = evaluate_opportunity(
            &pool1,
            &pool2,
            &flat_series(1.5),
            &flat_series(1.5),
            &base_config(),
        )
        .unwrap();
        assert!(!evaluation.should_execute);
        assert_eq!(evaluation.optimal_amount, 0.0);
    }

    #[test]
    fn high_profit_bar_keeps_partials() {
        let pool1 = cp(1_000_000.0, 2_000_000.0);
        let pool2 = cp(1_000_000.0, 1_500_000.0);
        let mut config = base_config();
        config.min_profit_threshold = 1e12;
        let evaluation = evaluate_opportunity(
            &pool1,
            &pool2,
            &flat_series(2.0),
            &flat_series(1.5),
            &config,
        )
        .unwrap();
        assert!(!evaluation.should_execute);
        // Sizing already ran, so its result is reported even though the
        // profit bar was not met.
        assert!(evaluation.optimal_amount > 0.0);
        assert!(evaluation.expected_profit > 0.0);
    }

    #[test]
    fn invalid_config_is_an_error() {
        let pool = cp(1_000_000.0, 2_000_000.0);
        let mut config = base_config();
        config.gas_cost = f64::NAN;
        assert!(
            evaluate_opportunity(&pool, &pool, &flat_series(2.0), &flat_series(2.0), &config)
                .is_err()
        );
    }
}
