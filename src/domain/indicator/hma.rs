//! Hull Moving Average indicator.
//!
//! HMA(n) = WMA(sqrt(n)) of the series 2*WMA(n/2) - WMA(n).
//! Sub-periods: half = max(1, n/2), root = max(1, round(sqrt(n))).
//! Warmup: first (n-1) + (root-1) bars are invalid.

use crate::domain::indicator::wma::wma_raw;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_hma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Hma(period),
            values: Vec::new(),
        };
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let half = (period / 2).max(1);
    let root = ((period as f64).sqrt().round() as usize).max(1);

    let wma_half = wma_raw(&closes, half);
    let wma_full = wma_raw(&closes, period);

    // Raw series 2*WMA(n/2) - WMA(n); 0.0 placeholder inside the full-WMA
    // warmup, which the final warmup bound already covers.
    let diff: Vec<f64> = wma_half
        .iter()
        .zip(wma_full.iter())
        .map(|(h, f)| match (h, f) {
            (Some(h), Some(f)) => 2.0 * h - f,
            _ => 0.0,
        })
        .collect();

    let hull = wma_raw(&diff, root);
    let warmup = (period - 1) + (root - 1);

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let valid = i >= warmup;
            let value = if valid {
                hull[i].unwrap_or(0.0)
            } else {
                0.0
            };
            IndicatorPoint {
                date: bar.date,
                valid,
                value: IndicatorValue::Simple(value),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Hma(period),
        values,
    }
}
