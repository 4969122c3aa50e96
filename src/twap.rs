//! Time-weighted average price and manipulation detection.

use crate::errors::{EngineError, Result};
use crate::models::PriceSample;

/// Time-weighted average of a price series using left-rectangle weighting:
/// each sample holds its price until the next sample arrives.
///
/// The trailing sample is weighted by the interval up to `eval_timestamp`
/// when one is supplied and lies after the sample; otherwise it carries no
/// weight. If the total weight is zero (single sample, no evaluation
/// timestamp) the last observed price is returned as-is.
///
/// Fails with `InvalidInput` on an empty series, a non-positive price, or
/// timestamps that go backwards.
pub fn twap(series: &[PriceSample], eval_timestamp: Option<f64>) -> Result<f64> {
    if series.is_empty() {
        return Err(EngineError::InvalidInput(
            "price series must not be empty".to_string(),
        ));
    }
    for (index, sample) in series.iter().enumerate() {
        if !sample.price.is_finite() || sample.price <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "price at index {index} must be finite and positive, got {}",
                sample.price
            )));
        }
        if !sample.timestamp.is_finite() {
            return Err(EngineError::InvalidInput(format!(
                "timestamp at index {index} is not finite"
            )));
        }
        if index > 0 && sample.timestamp < series[index - 1].timestamp {
            return Err(EngineError::InvalidInput(format!(
                "timestamps must be ascending, violated at index {index}"
            )));
        }
    }

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for window in series.windows(2) {
        let weight = window[1].timestamp - window[0].timestamp;
        weighted_sum += window[0].price * weight;
        total_weight += weight;
    }
    let last = series[series.len() - 1];
    if let Some(eval) = eval_timestamp {
        let trailing = eval - last.timestamp;
        if trailing > 0.0 {
            weighted_sum += last.price * trailing;
            total_weight += trailing;
        }
    }

    if total_weight <= 0.0 {
        return Ok(last.price);
    }
    Ok(weighted_sum / total_weight)
}

/// True iff the current price sits within `max_deviation_pct` percent of
/// the TWAP, i.e. the spot does not look manipulated.
pub fn validate_with_twap(current_price: f64, twap: f64, max_deviation_pct: f64) -> bool {
    if !current_price.is_finite() || !twap.is_finite() || twap <= 0.0 {
        return false;
    }
    (current_price - twap).abs() / twap * 100.0 <= max_deviation_pct
}
