//! Volume Weighted Moving Average indicator.
//!
//! VWMA(n) = sum(close*volume over n bars) / sum(volume over n bars).
//! A window with zero total volume falls back to the simple average of its
//! closes. Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_vwma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Vwma(period),
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut pv_sum = 0.0;
    let mut vol_sum = 0.0;
    let mut close_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        pv_sum += bar.close * bar.volume as f64;
        vol_sum += bar.volume as f64;
        close_sum += bar.close;
        if i >= period {
            let old = &bars[i - period];
            pv_sum -= old.close * old.volume as f64;
            vol_sum -= old.volume as f64;
            close_sum -= old.close;
        }

        let valid = i >= period - 1;
        let vwma = if !valid {
            0.0
        } else if vol_sum > 0.0 {
            pv_sum / vol_sum
        } else {
            close_sum / period as f64
        };

        values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value: IndicatorValue::Simple(vwma),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Vwma(period),
        values,
    }
}
