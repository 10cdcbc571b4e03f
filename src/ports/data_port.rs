//! Data access port trait.
//!
//! The screener consumes already-materialized daily series; fetching,
//! caching and network timeouts live behind this boundary.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// Full daily history for a symbol, ascending by date.
    fn fetch_daily(&self, symbol: &str) -> Result<Vec<OhlcvBar>, ScreenerError>;

    fn list_symbols(&self) -> Result<Vec<String>, ScreenerError>;
}
