//! Bollinger Bands indicator.
//!
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is population standard deviation (divides by N, not N-1).
//! The multiplier is carried as hundredths (200 = 2.0) so the parameter can
//! live in a hashable indicator key.
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_STDDEV_MULT_X100: u32 = 200;

pub fn calculate_bollinger(
    bars: &[OhlcvBar],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            },
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    let warmup = period - 1;
    let mult = stddev_mult_x100 as f64 / 100.0;

    for i in 0..bars.len() {
        let date = bars[i].date;
        let valid = i >= warmup;

        let (upper, middle, lower) = if valid {
            let window = &bars[i + 1 - period..=i];

            let middle: f64 = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
            let variance: f64 = window
                .iter()
                .map(|b| {
                    let diff = b.close - middle;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;

            let stddev = variance.sqrt();
            (middle + mult * stddev, middle, middle - mult * stddev)
        } else {
            (0.0, 0.0, 0.0)
        };

        values.push(IndicatorPoint {
            date,
            valid,
            value: IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            },
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        },
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                symbol: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn bollinger_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_bollinger(&bars, 3, 200);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn bollinger_constant_series_collapses() {
        let bars = make_bars(&[100.0; 5]);
        let series = calculate_bollinger(&bars, 3, 200);

        if let IndicatorValue::Bollinger {
            upper,
            middle,
            lower,
        } = series.values[2].value
        {
            assert!((middle - 100.0).abs() < f64::EPSILON);
            assert!((upper - 100.0).abs() < f64::EPSILON);
            assert!((lower - 100.0).abs() < f64::EPSILON);
        } else {
            panic!("Expected Bollinger value");
        }
    }

    #[test]
    fn bollinger_population_stddev() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 3, 200);

        if let IndicatorValue::Bollinger {
            upper,
            middle,
            lower,
        } = series.values[2].value
        {
            let expected_middle = 20.0;
            let variance = (100.0 + 0.0 + 100.0) / 3.0;
            let stddev = f64::sqrt(variance);

            assert!((middle - expected_middle).abs() < 1e-10);
            assert!((upper - (expected_middle + 2.0 * stddev)).abs() < 1e-10);
            assert!((lower - (expected_middle - 2.0 * stddev)).abs() < 1e-10);
        } else {
            panic!("Expected Bollinger value");
        }
    }

    #[test]
    fn bollinger_multiplier_scales_band_width() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let narrow = calculate_bollinger(&bars, 3, 100);
        let wide = calculate_bollinger(&bars, 3, 300);

        let (
            IndicatorValue::Bollinger { upper: n_up, middle, .. },
            IndicatorValue::Bollinger { upper: w_up, .. },
        ) = (&narrow.values[2].value, &wide.values[2].value)
        else {
            panic!("Expected Bollinger values");
        };
        assert!(((w_up - middle) - 3.0 * (n_up - middle)).abs() < 1e-9);
    }

    #[test]
    fn bollinger_bands_symmetric() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 3, 200);

        if let IndicatorValue::Bollinger {
            upper,
            middle,
            lower,
        } = series.values[2].value
        {
            assert!(((upper - middle) - (middle - lower)).abs() < 1e-10);
        } else {
            panic!("Expected Bollinger value");
        }
    }
}
