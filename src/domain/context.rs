//! Per-symbol evaluation context.
//!
//! Owns one symbol's daily bars plus everything derived from them during a
//! single strategy evaluation: lazily resampled weekly/monthly frames, a
//! memoization map from (timeframe, indicator type) to its computed series,
//! and memoized named-operand resolutions. A context belongs to exactly one
//! evaluation and is discarded with the verdict; concurrent evaluations each
//! build their own.

use crate::domain::indicator::{self, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::timeframe::{Timeframe, resample};
use std::collections::HashMap;

#[derive(Debug)]
pub struct EvaluationContext {
    pub symbol: String,
    frames: HashMap<Timeframe, Vec<OhlcvBar>>,
    indicators: HashMap<(Timeframe, IndicatorType), IndicatorSeries>,
    resolved_refs: HashMap<String, Option<f64>>,
    /// Number of indicator series computed from scratch. Lets tests assert
    /// that repeated operand resolution hits the memo instead of recomputing.
    pub computations: usize,
}

impl EvaluationContext {
    pub fn new(symbol: String, daily: Vec<OhlcvBar>) -> Self {
        let mut frames = HashMap::new();
        frames.insert(Timeframe::Daily, daily);
        Self {
            symbol,
            frames,
            indicators: HashMap::new(),
            resolved_refs: HashMap::new(),
            computations: 0,
        }
    }

    /// Bars for a timeframe, resampling from daily on first use.
    pub fn bars(&mut self, timeframe: Timeframe) -> &[OhlcvBar] {
        if !self.frames.contains_key(&timeframe) {
            let resampled = resample(&self.frames[&Timeframe::Daily], timeframe);
            self.frames.insert(timeframe, resampled);
        }
        &self.frames[&timeframe]
    }

    /// Indicator series for (timeframe, type), computed once and memoized.
    pub fn indicator(
        &mut self,
        timeframe: Timeframe,
        indicator_type: &IndicatorType,
    ) -> &IndicatorSeries {
        let key = (timeframe, indicator_type.clone());
        if !self.indicators.contains_key(&key) {
            self.bars(timeframe);
            let series = indicator::compute(&self.frames[&timeframe], indicator_type);
            self.computations += 1;
            self.indicators.insert(key.clone(), series);
        }
        &self.indicators[&key]
    }

    pub fn cached_ref(&self, id: &str) -> Option<Option<f64>> {
        self.resolved_refs.get(id).copied()
    }

    pub fn store_ref(&mut self, id: &str, value: Option<f64>) {
        self.resolved_refs.insert(id.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_daily(n: usize) -> Vec<OhlcvBar> {
        (0..n)
            .map(|i| {
                let date =
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64);
                let close = 100.0 + i as f64;
                OhlcvBar {
                    symbol: "TEST".into(),
                    date,
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1000,
                }
            })
            .collect()
    }

    #[test]
    fn daily_frame_is_the_input() {
        let mut ctx = EvaluationContext::new("TEST".into(), make_daily(10));
        assert_eq!(ctx.bars(Timeframe::Daily).len(), 10);
    }

    #[test]
    fn weekly_frame_resampled_once() {
        let mut ctx = EvaluationContext::new("TEST".into(), make_daily(10));
        let weekly_len = ctx.bars(Timeframe::Weekly).len();
        assert!(weekly_len < 10);
        assert_eq!(ctx.bars(Timeframe::Weekly).len(), weekly_len);
    }

    #[test]
    fn indicator_memoized_per_timeframe_and_type() {
        let mut ctx = EvaluationContext::new("TEST".into(), make_daily(30));

        ctx.indicator(Timeframe::Daily, &IndicatorType::Sma(5));
        assert_eq!(ctx.computations, 1);

        // Same request hits the memo.
        ctx.indicator(Timeframe::Daily, &IndicatorType::Sma(5));
        assert_eq!(ctx.computations, 1);

        // Different period or timeframe computes fresh.
        ctx.indicator(Timeframe::Daily, &IndicatorType::Sma(10));
        assert_eq!(ctx.computations, 2);
        ctx.indicator(Timeframe::Weekly, &IndicatorType::Sma(5));
        assert_eq!(ctx.computations, 3);
    }

    #[test]
    fn memoized_series_identical_values() {
        let mut ctx = EvaluationContext::new("TEST".into(), make_daily(30));

        let first: Vec<f64> = ctx
            .indicator(Timeframe::Daily, &IndicatorType::Sma(5))
            .values
            .iter()
            .map(|p| match p.value {
                crate::domain::indicator::IndicatorValue::Simple(v) => v,
                _ => f64::NAN,
            })
            .collect();
        let second: Vec<f64> = ctx
            .indicator(Timeframe::Daily, &IndicatorType::Sma(5))
            .values
            .iter()
            .map(|p| match p.value {
                crate::domain::indicator::IndicatorValue::Simple(v) => v,
                _ => f64::NAN,
            })
            .collect();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn ref_memoization() {
        let mut ctx = EvaluationContext::new("TEST".into(), make_daily(5));
        assert_eq!(ctx.cached_ref("x"), None);

        ctx.store_ref("x", Some(1.5));
        assert_eq!(ctx.cached_ref("x"), Some(Some(1.5)));

        ctx.store_ref("y", None);
        assert_eq!(ctx.cached_ref("y"), Some(None));
    }
}
