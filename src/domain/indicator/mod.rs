//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values
//!
//! Every `calculate_*` function returns a series index-aligned with its input
//! bars; warmup positions carry `valid: false`. Numeric edge cases (zero
//! average loss, zero volume window) saturate to the indicator's documented
//! value rather than erroring.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod hma;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod volume_sma;
pub mod vwma;
pub mod wma;

pub use adx::calculate_adx;
pub use atr::{calculate_atr, calculate_atr_ratio};
pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use hma::calculate_hma;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use volume_sma::calculate_volume_sma;
pub use vwma::calculate_vwma;
pub use wma::calculate_wma;

use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Wma(usize),
    Hma(usize),
    Vwma(usize),
    VolumeSma(usize),
    Rsi(usize),
    Atr(usize),
    AtrRatio(usize),
    Adx(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

/// Compute the series for any indicator type over a bar slice.
pub fn compute(bars: &[OhlcvBar], indicator_type: &IndicatorType) -> IndicatorSeries {
    match *indicator_type {
        IndicatorType::Sma(period) => calculate_sma(bars, period),
        IndicatorType::Ema(period) => calculate_ema(bars, period),
        IndicatorType::Wma(period) => calculate_wma(bars, period),
        IndicatorType::Hma(period) => calculate_hma(bars, period),
        IndicatorType::Vwma(period) => calculate_vwma(bars, period),
        IndicatorType::VolumeSma(period) => calculate_volume_sma(bars, period),
        IndicatorType::Rsi(period) => calculate_rsi(bars, period),
        IndicatorType::Atr(period) => calculate_atr(bars, period),
        IndicatorType::AtrRatio(period) => calculate_atr_ratio(bars, period),
        IndicatorType::Adx(period) => calculate_adx(bars, period),
        IndicatorType::Macd { fast, slow, signal } => calculate_macd(bars, fast, slow, signal),
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(bars, period, stddev_mult_x100),
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Wma(period) => write!(f, "WMA({})", period),
            IndicatorType::Hma(period) => write!(f, "HMA({})", period),
            IndicatorType::Vwma(period) => write!(f, "VWMA({})", period),
            IndicatorType::VolumeSma(period) => write!(f, "VOLUME_SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::AtrRatio(period) => write!(f, "ATR_RATIO({})", period),
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}
