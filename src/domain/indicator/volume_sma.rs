//! Simple Moving Average over volume.
//!
//! Same rolling-sum shape as the close SMA, applied to volume. Used by
//! liquidity conditions such as `volume > volume_sma(20)`.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_volume_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::VolumeSma(period),
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut window_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += bar.volume as f64;
        if i >= period {
            window_sum -= bars[i - period].volume as f64;
        }

        let valid = i >= period - 1;
        let avg = if valid { window_sum / period as f64 } else { 0.0 };

        values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value: IndicatorValue::Simple(avg),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::VolumeSma(period),
        values,
    }
}
