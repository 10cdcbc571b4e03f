//! Weighted Moving Average indicator.
//!
//! WMA(n) = (1*P[i-n+1] + 2*P[i-n+2] + ... + n*P[i]) / (n*(n+1)/2)
//! O(n) sliding-window implementation.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_wma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let raw = wma_raw(&closes, period);

    let values = bars
        .iter()
        .zip(raw.iter())
        .map(|(bar, wma)| IndicatorPoint {
            date: bar.date,
            valid: wma.is_some(),
            value: IndicatorValue::Simple(wma.unwrap_or(0.0)),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Wma(period),
        values,
    }
}

/// WMA over a raw value slice; `None` for warmup positions.
///
/// Shared with the Hull MA, which applies WMA to a derived series rather
/// than to closes.
pub(crate) fn wma_raw(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || values.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(values.len());
    let divisor = (period * (period + 1)) as f64 / 2.0;
    let mut weighted_sum: f64 = 0.0;
    let mut window_sum: f64 = 0.0;

    for (i, &value) in values.iter().enumerate() {
        if i < period {
            let weight = (i + 1) as f64;
            weighted_sum += weight * value;
            window_sum += value;
        } else {
            weighted_sum += period as f64 * value - window_sum;
            window_sum += value - values[i - period];
        }

        if i >= period - 1 {
            out.push(Some(weighted_sum / divisor));
        } else {
            out.push(None);
        }
    }

    out
}
