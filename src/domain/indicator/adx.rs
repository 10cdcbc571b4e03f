//! ADX (Average Directional Index) indicator, Wilder formulation.
//!
//! +DM = up-move when it exceeds the down-move and is positive, else 0;
//! -DM symmetric. TR, +DM, -DM are Wilder-smoothed over n; DI± = 100 * smoothed
//! DM / smoothed TR; DX = 100 * |+DI - -DI| / (+DI + -DI); ADX is the Wilder
//! average of DX, seeded by the mean of the first n DX values.
//!
//! Warmup: first (2n-1) bars are invalid. Zero denominators (flat or gapless
//! windows) yield 0 for the affected DI/DX, never an error.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_adx(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let warmup = 2 * period.max(1) - 1;
    if period == 0 || bars.len() <= warmup {
        let values = bars
            .iter()
            .map(|b| IndicatorPoint {
                date: b.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            })
            .collect();
        return IndicatorSeries {
            indicator_type: IndicatorType::Adx(period),
            values,
        };
    }

    let len = bars.len();
    let mut tr = vec![0.0; len];
    let mut plus_dm = vec![0.0; len];
    let mut minus_dm = vec![0.0; len];

    for i in 1..len {
        let up_move = bars[i].high - bars[i - 1].high;
        let down_move = bars[i - 1].low - bars[i].low;
        plus_dm[i] = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        minus_dm[i] = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };
        tr[i] = bars[i].true_range(bars[i - 1].close);
    }

    // Wilder-smoothed TR and DM; index i is defined from i == period onward
    // (the first `period` changes live at indices 1..=period).
    let smooth = |series: &[f64]| -> Vec<f64> {
        let mut out = vec![0.0; len];
        let mut avg = series[1..=period].iter().sum::<f64>() / period as f64;
        out[period] = avg;
        for i in (period + 1)..len {
            avg = (avg * (period - 1) as f64 + series[i]) / period as f64;
            out[i] = avg;
        }
        out
    };

    let tr_s = smooth(&tr);
    let plus_s = smooth(&plus_dm);
    let minus_s = smooth(&minus_dm);

    let mut dx = vec![0.0; len];
    for i in period..len {
        let (plus_di, minus_di) = if tr_s[i] > 0.0 {
            (100.0 * plus_s[i] / tr_s[i], 100.0 * minus_s[i] / tr_s[i])
        } else {
            (0.0, 0.0)
        };
        let di_sum = plus_di + minus_di;
        dx[i] = if di_sum > 0.0 {
            100.0 * (plus_di - minus_di).abs() / di_sum
        } else {
            0.0
        };
    }

    let mut values = Vec::with_capacity(len);
    let mut adx = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i < warmup {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            });
            continue;
        }

        if i == warmup {
            adx = dx[period..=warmup].iter().sum::<f64>() / period as f64;
        } else {
            adx = (adx * (period - 1) as f64 + dx[i]) / period as f64;
        }
        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::Simple(adx),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Adx(period),
        values,
    }
}
