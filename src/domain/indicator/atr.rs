//! ATR (Average True Range) indicator, Wilder smoothing.
//!
//! TR[0] = high - low; TR[i] = max(high-low, |high-prev_close|, |low-prev_close|).
//! Seed: simple mean of the first n true ranges, then
//! ATR[i] = (ATR[i-1]*(n-1) + TR[i]) / n.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let raw = atr_raw(bars, period);
    let values = bars
        .iter()
        .zip(raw.iter())
        .map(|(bar, atr)| IndicatorPoint {
            date: bar.date,
            valid: atr.is_some(),
            value: IndicatorValue::Simple(atr.unwrap_or(0.0)),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}

/// ATR divided by the bar's close: volatility normalized by price level.
/// A zero close yields 0.0 rather than an infinity.
pub fn calculate_atr_ratio(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let raw = atr_raw(bars, period);
    let values = bars
        .iter()
        .zip(raw.iter())
        .map(|(bar, atr)| {
            let ratio = atr.map(|a| if bar.close > 0.0 { a / bar.close } else { 0.0 });
            IndicatorPoint {
                date: bar.date,
                valid: ratio.is_some(),
                value: IndicatorValue::Simple(ratio.unwrap_or(0.0)),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::AtrRatio(period),
        values,
    }
}

fn atr_raw(bars: &[OhlcvBar], period: usize) -> Vec<Option<f64>> {
    if period == 0 || bars.is_empty() {
        return vec![None; bars.len()];
    }

    let mut tr_values: Vec<f64> = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let tr = if i == 0 {
            bar.high - bar.low
        } else {
            bar.true_range(bars[i - 1].close)
        };
        tr_values.push(tr);
    }

    let mut out: Vec<Option<f64>> = Vec::with_capacity(bars.len());
    let mut atr = 0.0;

    for i in 0..bars.len() {
        if i < period - 1 {
            out.push(None);
        } else if i == period - 1 {
            atr = tr_values[..period].iter().sum::<f64>() / period as f64;
            out.push(Some(atr));
        } else {
            atr = (atr * (period - 1) as f64 + tr_values[i]) / period as f64;
            out.push(Some(atr));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(day: u32, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            symbol: "TEST".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn atr_warmup_and_seed() {
        let bars = vec![
            make_bar(1, 110.0, 100.0, 105.0),
            make_bar(2, 115.0, 105.0, 110.0),
            make_bar(3, 120.0, 110.0, 115.0),
        ];
        let series = calculate_atr(&bars, 3);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);

        // TRs are all 10 → seed average is 10
        if let IndicatorValue::Simple(v) = series.values[2].value {
            assert!((v - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn atr_wilder_smoothing() {
        let bars = vec![
            make_bar(1, 110.0, 100.0, 105.0),
            make_bar(2, 115.0, 105.0, 110.0),
            make_bar(3, 120.0, 110.0, 115.0),
            make_bar(4, 125.0, 115.0, 120.0),
        ];
        let series = calculate_atr(&bars, 3);

        // seed=10, then (10*2 + 10)/3 = 10
        if let IndicatorValue::Simple(v) = series.values[3].value {
            assert!((v - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn atr_gap_uses_true_range() {
        let bars = vec![
            make_bar(1, 110.0, 100.0, 105.0),
            // gap up: TR = |130 - 105| = 25, not high-low = 10
            make_bar(2, 130.0, 120.0, 125.0),
        ];
        let series = calculate_atr(&bars, 2);

        if let IndicatorValue::Simple(v) = series.values[1].value {
            assert!((v - (10.0 + 25.0) / 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn atr_ratio_normalizes_by_close() {
        let bars = vec![
            make_bar(1, 110.0, 100.0, 100.0),
            make_bar(2, 110.0, 100.0, 100.0),
        ];
        let series = calculate_atr_ratio(&bars, 2);

        if let IndicatorValue::Simple(v) = series.values[1].value {
            assert!((v - 0.1).abs() < 1e-9);
        }
    }

    #[test]
    fn atr_insufficient_bars() {
        let bars = vec![make_bar(1, 110.0, 100.0, 105.0)];
        let series = calculate_atr(&bars, 5);
        assert_eq!(series.values.len(), 1);
        assert!(!series.values[0].valid);
    }
}
