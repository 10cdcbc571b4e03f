//! Strategy data structures.
//!
//! This module defines the typed model a validated strategy is loaded into:
//! - `Operand`: What can be compared (price fields, constants, indicators,
//!   references to named operands)
//! - `IndicatorField`: Which field of a multi-value indicator to use
//! - `Condition`: One comparison between two operands
//! - `Strategy`: Named condition list, combined with AND
//!
//! Values are produced exclusively by `strategy_parser`, which rejects every
//! malformed shape before evaluation sees it.

use crate::domain::indicator::IndicatorType;
use crate::domain::timeframe::Timeframe;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
    Turnover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorField {
    Value,
    MacdLine,
    MacdSignal,
    MacdHistogram,
    BollingerUpper,
    BollingerMiddle,
    BollingerLower,
}

/// Affine transform applied to a resolved operand value:
/// `value * multiplier + add_offset`. Identity by default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub multiplier: f64,
    pub add_offset: f64,
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            add_offset: 0.0,
        }
    }
}

impl Scale {
    pub fn apply(&self, value: f64) -> f64 {
        value * self.multiplier + self.add_offset
    }

    pub fn is_identity(&self) -> bool {
        self.multiplier == 1.0 && self.add_offset == 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Price {
        field: PriceField,
        timeframe: Timeframe,
        offset: usize,
        scale: Scale,
    },
    Indicator {
        indicator: IndicatorType,
        field: IndicatorField,
        timeframe: Timeframe,
        offset: usize,
        scale: Scale,
    },
    Constant(f64),
    Ref {
        id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
    /// Within a percent tolerance of the larger magnitude side.
    Approx,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Comparator::Gt => ">",
            Comparator::Lt => "<",
            Comparator::Ge => ">=",
            Comparator::Le => "<=",
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
            Comparator::Approx => "≈",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub lhs: Operand,
    pub comparator: Comparator,
    pub rhs: Operand,
    /// Percent tolerance for `Comparator::Approx`; ignored otherwise.
    pub tolerance_pct: f64,
}

#[derive(Debug, Clone)]
pub struct Strategy {
    pub name: String,
    pub description: String,
    /// Named operands that conditions (and other named operands) may
    /// reference via `Operand::Ref`. Validated acyclic at load time.
    pub operands: HashMap<String, Operand>,
    pub conditions: Vec<Condition>,
}
