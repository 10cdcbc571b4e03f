//! Screening driver.
//!
//! Iterates a symbol universe, evaluates the strategy once per symbol with a
//! fresh [`EvaluationContext`], and collects per-symbol rows. A failed or
//! empty fetch becomes a `Skipped(NoData)` row; nothing aborts the batch. A
//! match-count limit and a stop flag are honored between symbol evaluations,
//! never mid-symbol.

use crate::domain::context::EvaluationContext;
use crate::domain::eval::{Evaluation, SkipReason, Verdict, evaluate_strategy};
use crate::domain::strategy::Strategy;
use crate::ports::data_port::DataPort;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
pub struct ScreenOptions {
    /// Stop once this many symbols have matched.
    pub max_matches: Option<usize>,
    /// Externally owned stop flag, checked between symbols.
    pub stop: Option<Arc<AtomicBool>>,
}

#[derive(Debug, Clone)]
pub struct ScreenRow {
    pub symbol: String,
    pub evaluation: Evaluation,
}

#[derive(Debug, Clone)]
pub struct ScreenReport {
    pub strategy_name: String,
    pub rows: Vec<ScreenRow>,
    pub matched: usize,
    /// True when the run ended on the match limit or the stop flag rather
    /// than exhausting the universe.
    pub stopped_early: bool,
}

pub fn run_screen(
    data_port: &dyn DataPort,
    symbols: &[String],
    strategy: &Strategy,
    options: &ScreenOptions,
) -> ScreenReport {
    let mut rows = Vec::with_capacity(symbols.len());
    let mut matched = 0;
    let mut stopped_early = false;

    for symbol in symbols {
        if options.max_matches.is_some_and(|limit| matched >= limit) {
            stopped_early = true;
            break;
        }
        if options
            .stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            stopped_early = true;
            break;
        }

        let evaluation = match data_port.fetch_daily(symbol) {
            Ok(daily) if !daily.is_empty() => {
                let mut ctx = EvaluationContext::new(symbol.clone(), daily);
                evaluate_strategy(strategy, &mut ctx)
            }
            Ok(_) => {
                eprintln!("Warning: skipping {} (no data found)", symbol);
                skipped_no_data()
            }
            Err(e) => {
                eprintln!("Warning: skipping {} ({})", symbol, e);
                skipped_no_data()
            }
        };

        if evaluation.verdict == Verdict::Matched {
            matched += 1;
        }
        rows.push(ScreenRow {
            symbol: symbol.clone(),
            evaluation,
        });
    }

    ScreenReport {
        strategy_name: strategy.name.clone(),
        rows,
        matched,
        stopped_early,
    }
}

fn skipped_no_data() -> Evaluation {
    Evaluation {
        verdict: Verdict::Skipped(SkipReason::NoData),
        conditions: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ScreenerError;
    use crate::domain::ohlcv::OhlcvBar;
    use crate::domain::strategy::{Comparator, Condition, Operand, PriceField, Scale};
    use crate::domain::timeframe::Timeframe;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    struct FixedPort {
        data: HashMap<String, Vec<OhlcvBar>>,
        errors: Vec<String>,
    }

    impl DataPort for FixedPort {
        fn fetch_daily(&self, symbol: &str) -> Result<Vec<OhlcvBar>, ScreenerError> {
            if self.errors.iter().any(|s| s == symbol) {
                return Err(ScreenerError::Data {
                    reason: "boom".into(),
                });
            }
            Ok(self.data.get(symbol).cloned().unwrap_or_default())
        }

        fn list_symbols(&self) -> Result<Vec<String>, ScreenerError> {
            Ok(self.data.keys().cloned().collect())
        }
    }

    fn make_daily(closes: &[f64]) -> Vec<OhlcvBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let date =
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64);
                OhlcvBar {
                    symbol: "X".into(),
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

    fn close_above_100() -> Strategy {
        Strategy {
            name: "close>100".into(),
            description: String::new(),
            operands: HashMap::new(),
            conditions: vec![Condition {
                lhs: Operand::Price {
                    field: PriceField::Close,
                    timeframe: Timeframe::Daily,
                    offset: 0,
                    scale: Scale::default(),
                },
                comparator: Comparator::Gt,
                rhs: Operand::Constant(100.0),
                tolerance_pct: 1.0,
            }],
        }
    }

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn collects_all_verdicts() {
        let mut data = HashMap::new();
        data.insert("UP".to_string(), make_daily(&[99.0, 110.0]));
        data.insert("DOWN".to_string(), make_daily(&[99.0, 90.0]));
        data.insert("EMPTY".to_string(), Vec::new());
        let port = FixedPort {
            data,
            errors: vec!["ERR".to_string()],
        };

        let report = run_screen(
            &port,
            &symbols(&["UP", "DOWN", "EMPTY", "ERR"]),
            &close_above_100(),
            &ScreenOptions::default(),
        );

        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.matched, 1);
        assert!(!report.stopped_early);
        assert_eq!(report.rows[0].evaluation.verdict, Verdict::Matched);
        assert_eq!(report.rows[1].evaluation.verdict, Verdict::NotMatched);
        assert_eq!(
            report.rows[2].evaluation.verdict,
            Verdict::Skipped(SkipReason::NoData)
        );
        assert_eq!(
            report.rows[3].evaluation.verdict,
            Verdict::Skipped(SkipReason::NoData)
        );
    }

    #[test]
    fn fetch_error_does_not_abort_batch() {
        let mut data = HashMap::new();
        data.insert("GOOD".to_string(), make_daily(&[110.0]));
        let port = FixedPort {
            data,
            errors: vec!["BAD".to_string()],
        };

        let report = run_screen(
            &port,
            &symbols(&["BAD", "GOOD"]),
            &close_above_100(),
            &ScreenOptions::default(),
        );

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[1].evaluation.verdict, Verdict::Matched);
    }

    #[test]
    fn match_limit_stops_between_symbols() {
        let mut data = HashMap::new();
        for name in ["A", "B", "C"] {
            data.insert(name.to_string(), make_daily(&[110.0]));
        }
        let port = FixedPort {
            data,
            errors: Vec::new(),
        };

        let options = ScreenOptions {
            max_matches: Some(2),
            stop: None,
        };
        let report = run_screen(&port, &symbols(&["A", "B", "C"]), &close_above_100(), &options);

        assert_eq!(report.matched, 2);
        assert_eq!(report.rows.len(), 2);
        assert!(report.stopped_early);
    }

    #[test]
    fn stop_flag_halts_run() {
        let mut data = HashMap::new();
        data.insert("A".to_string(), make_daily(&[110.0]));
        let port = FixedPort {
            data,
            errors: Vec::new(),
        };

        let stop = Arc::new(AtomicBool::new(true));
        let options = ScreenOptions {
            max_matches: None,
            stop: Some(stop),
        };
        let report = run_screen(&port, &symbols(&["A"]), &close_above_100(), &options);

        assert!(report.rows.is_empty());
        assert!(report.stopped_early);
    }
}
