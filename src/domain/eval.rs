//! Strategy evaluation engine.
//!
//! Evaluates a strategy's conditions against one symbol's evaluation
//! context.
//!
//! # Evaluation Semantics
//!
//! - An operand resolves to `Some(value)` or `None` (undecidable: offset
//!   beyond history, indicator still in warmup, or a non-finite value).
//! - A condition with an undecidable side is `Undecidable`; equality and
//!   inequality compare with a relative epsilon of 1e-9.
//! - Conditions combine with AND in declaration order and short-circuit on
//!   the first terminal outcome: `Fail` → `NotMatched`, `Undecidable` →
//!   `Skipped(InsufficientData)`. All `Pass` → `Matched`. An undecidable
//!   symbol is never silently a pass or a fail.
//! - Offset 0 indexes the most recent bar of the operand's timeframe
//!   (including the forming weekly/monthly bar); offset k indexes k bars
//!   earlier.

use crate::domain::context::EvaluationContext;
use crate::domain::indicator::IndicatorValue;
use crate::domain::strategy::{Comparator, Condition, IndicatorField, Operand, PriceField, Strategy};
use std::collections::HashSet;
use std::fmt;

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOutcome {
    Pass,
    Fail,
    Undecidable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InsufficientData,
    NoData,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientData => write!(f, "insufficient_data"),
            SkipReason::NoData => write!(f, "no_data"),
        }
    }
}

/// Per-symbol screening outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Matched,
    NotMatched,
    Skipped(SkipReason),
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Matched => write!(f, "matched"),
            Verdict::NotMatched => write!(f, "not_matched"),
            Verdict::Skipped(reason) => write!(f, "skipped({})", reason),
        }
    }
}

/// Resolved values and outcome of one condition, kept for display.
#[derive(Debug, Clone)]
pub struct ConditionReport {
    pub index: usize,
    pub lhs: Option<f64>,
    pub rhs: Option<f64>,
    pub outcome: ConditionOutcome,
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub verdict: Verdict,
    /// Reports for conditions evaluated before the verdict was decided,
    /// in declaration order.
    pub conditions: Vec<ConditionReport>,
}

pub fn evaluate_strategy(strategy: &Strategy, ctx: &mut EvaluationContext) -> Evaluation {
    let mut reports = Vec::with_capacity(strategy.conditions.len());

    for (index, condition) in strategy.conditions.iter().enumerate() {
        let (outcome, lhs, rhs) = evaluate_condition(condition, strategy, ctx);
        reports.push(ConditionReport {
            index,
            lhs,
            rhs,
            outcome,
        });

        match outcome {
            ConditionOutcome::Pass => {}
            ConditionOutcome::Fail => {
                return Evaluation {
                    verdict: Verdict::NotMatched,
                    conditions: reports,
                };
            }
            ConditionOutcome::Undecidable => {
                return Evaluation {
                    verdict: Verdict::Skipped(SkipReason::InsufficientData),
                    conditions: reports,
                };
            }
        }
    }

    Evaluation {
        verdict: Verdict::Matched,
        conditions: reports,
    }
}

pub fn evaluate_condition(
    condition: &Condition,
    strategy: &Strategy,
    ctx: &mut EvaluationContext,
) -> (ConditionOutcome, Option<f64>, Option<f64>) {
    let mut visited = HashSet::new();
    let lhs = resolve_operand(&condition.lhs, strategy, ctx, &mut visited);
    visited.clear();
    let rhs = resolve_operand(&condition.rhs, strategy, ctx, &mut visited);

    let outcome = match (lhs, rhs) {
        (Some(l), Some(r)) => {
            if compare(condition.comparator, l, r, condition.tolerance_pct) {
                ConditionOutcome::Pass
            } else {
                ConditionOutcome::Fail
            }
        }
        _ => ConditionOutcome::Undecidable,
    };
    (outcome, lhs, rhs)
}

/// Resolve an operand to a scalar as of the latest bar of its timeframe.
///
/// `visited` guards reference chains against re-entry; load-time validation
/// already rejects cyclic strategies, so a repeat visit resolves to `None`
/// instead of recursing.
pub fn resolve_operand(
    operand: &Operand,
    strategy: &Strategy,
    ctx: &mut EvaluationContext,
    visited: &mut HashSet<String>,
) -> Option<f64> {
    match operand {
        Operand::Constant(value) => Some(*value),

        Operand::Price {
            field,
            timeframe,
            offset,
            scale,
        } => {
            let bars = ctx.bars(*timeframe);
            let idx = bars.len().checked_sub(1 + offset)?;
            let bar = &bars[idx];
            let raw = match field {
                PriceField::Open => bar.open,
                PriceField::High => bar.high,
                PriceField::Low => bar.low,
                PriceField::Close => bar.close,
                PriceField::Volume => bar.volume as f64,
                PriceField::Turnover => bar.turnover(),
            };
            finite(scale.apply(raw))
        }

        Operand::Indicator {
            indicator,
            field,
            timeframe,
            offset,
            scale,
        } => {
            let series = ctx.indicator(*timeframe, indicator);
            let idx = series.values.len().checked_sub(1 + offset)?;
            let point = &series.values[idx];
            if !point.valid {
                return None;
            }
            let raw = extract_field(&point.value, *field);
            finite(scale.apply(raw))
        }

        Operand::Ref { id } => {
            if let Some(cached) = ctx.cached_ref(id) {
                return cached;
            }
            if !visited.insert(id.clone()) {
                return None;
            }
            let target = strategy.operands.get(id)?;
            let value = resolve_operand(target, strategy, ctx, visited);
            ctx.store_ref(id, value);
            value
        }
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn compare(comparator: Comparator, lhs: f64, rhs: f64, tolerance_pct: f64) -> bool {
    match comparator {
        Comparator::Gt => lhs > rhs,
        Comparator::Lt => lhs < rhs,
        Comparator::Ge => lhs >= rhs,
        Comparator::Le => lhs <= rhs,
        Comparator::Eq => approx_eq(lhs, rhs),
        Comparator::Ne => !approx_eq(lhs, rhs),
        Comparator::Approx => {
            let base = lhs.abs().max(rhs.abs());
            (lhs - rhs).abs() <= base * tolerance_pct / 100.0
        }
    }
}

/// Relative-epsilon equality, floored at EPSILON for values near zero.
fn approx_eq(lhs: f64, rhs: f64) -> bool {
    let scale = 1.0f64.max(lhs.abs()).max(rhs.abs());
    (lhs - rhs).abs() <= EPSILON * scale
}

fn extract_field(value: &IndicatorValue, field: IndicatorField) -> f64 {
    match (value, field) {
        (IndicatorValue::Simple(v), IndicatorField::Value) => *v,
        (IndicatorValue::Macd { line, .. }, IndicatorField::MacdLine) => *line,
        (IndicatorValue::Macd { signal, .. }, IndicatorField::MacdSignal) => *signal,
        (IndicatorValue::Macd { histogram, .. }, IndicatorField::MacdHistogram) => *histogram,
        (IndicatorValue::Bollinger { upper, .. }, IndicatorField::BollingerUpper) => *upper,
        (IndicatorValue::Bollinger { middle, .. }, IndicatorField::BollingerMiddle) => *middle,
        (IndicatorValue::Bollinger { lower, .. }, IndicatorField::BollingerLower) => *lower,
        _ => f64::NAN,
    }
}
