//! Analysis timeframes and daily → weekly/monthly resampling.
//!
//! Weekly bars group daily bars by ISO calendar week, monthly bars by
//! calendar month. Aggregation: open = first open, close = last close,
//! high = max high, low = min low, volume = sum. A resampled bar carries the
//! date of its last constituent daily bar.
//!
//! The in-progress (most recent, incomplete) week or month IS emitted as the
//! latest bar, so offset 0 always reflects the forming period. Resampling
//! never rejects a series; short input just yields a shorter output.

use crate::domain::ohlcv::OhlcvBar;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::Daily => write!(f, "daily"),
            Timeframe::Weekly => write!(f, "weekly"),
            Timeframe::Monthly => write!(f, "monthly"),
        }
    }
}

pub fn resample(daily: &[OhlcvBar], timeframe: Timeframe) -> Vec<OhlcvBar> {
    match timeframe {
        Timeframe::Daily => daily.to_vec(),
        Timeframe::Weekly => group_bars(daily, |d| {
            let week = d.iso_week();
            (week.year(), week.week())
        }),
        Timeframe::Monthly => group_bars(daily, |d| (d.year(), d.month())),
    }
}

fn group_bars(daily: &[OhlcvBar], key: impl Fn(NaiveDate) -> (i32, u32)) -> Vec<OhlcvBar> {
    let mut bars: Vec<OhlcvBar> = Vec::new();
    let mut current_key: Option<(i32, u32)> = None;

    for bar in daily {
        let bar_key = key(bar.date);
        match bars.last_mut() {
            Some(agg) if current_key == Some(bar_key) => {
                agg.date = bar.date;
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
            _ => {
                bars.push(bar.clone());
                current_key = Some(bar_key);
            }
        }
    }

    bars
}
