//! Shared data structures used throughout the engine.

use serde::{Deserialize, Serialize};

/// One observation of a pool pair's price at a point in time.
///
/// A price series is an ordered (ascending timestamp), non-empty slice of
/// these samples, supplied by the caller's price-feed layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Unix timestamp in seconds.
    pub timestamp: f64,
    /// Observed price, strictly positive.
    pub price: f64,
}

/// Which pool of a pair carries the buy leg of the round trip.
///
/// The buy pool is the one quoting the higher `reserve_out / reserve_in`
/// spot price: the hop asset is cheaper there, so the cycle enters through
/// it and exits through the other pool reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    BuyPool1,
    BuyPool2,
}

/// Final verdict of the gated evaluation pipeline for one opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpportunityEvaluation {
    pub should_execute: bool,
    /// Flashloan size chosen by the optimizer, `0.0` when sizing was never
    /// reached or found no profitable size.
    pub optimal_amount: f64,
    /// Expected net profit at `optimal_amount`. May be negative only when
    /// `should_execute` is false.
    pub expected_profit: f64,
}

/// Per-path result of the parallel route simulator, index-stable with the
/// input array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathEvaluation {
    /// Net profit of the flashloan-funded trip through the path.
    pub profit: f64,
    /// Cumulative slippage across all hops, in percent.
    pub slippage_pct: f64,
    /// Position of the path in the caller's input array.
    pub path_index: usize,
}
