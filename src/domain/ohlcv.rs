//! OHLCV bar representation.

use chrono::NaiveDate;

/// One observed trading period for a symbol.
///
/// Invariants (guaranteed by the data layer): `high >= max(open, close, low)`
/// and `low <= min(open, close, high)`; dates within a series are strictly
/// ascending.
#[derive(Debug, Clone)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// Traded value of the bar: close * volume.
    pub fn turnover(&self) -> f64 {
        self.close * self.volume as f64
    }
}
