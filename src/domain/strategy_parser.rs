//! Strategy JSON parsing and validation.
//!
//! Converts the strategy document format
//! (`{"name", "description", "operands"?, "conditions": [{"lhs", "operator",
//! "rhs", "tolerance"?}]}` with operands tagged `"type": "indicator" |
//! "value" | "ref"`) into the typed [`Strategy`] model, rejecting every
//! malformed shape eagerly: unknown indicator names, bad params, unknown
//! operators, empty condition lists, unresolved or cyclic operand
//! references. Evaluation never sees an invalid strategy.

use crate::domain::error::{DefinitionError, ScreenerError};
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::bollinger::DEFAULT_STDDEV_MULT_X100;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::strategy::{
    Comparator, Condition, IndicatorField, Operand, PriceField, Scale, Strategy,
};
use crate::domain::timeframe::Timeframe;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_TOLERANCE_PCT: f64 = 1.0;

const DEFAULT_MA_PERIOD: usize = 20;
const DEFAULT_MOMENTUM_PERIOD: usize = 14;

/// Recognized indicator names, for error messages and CLI listing.
pub const INDICATOR_NAMES: &[&str] = &[
    "open",
    "high",
    "low",
    "close",
    "volume",
    "volume_turnover",
    "sma",
    "ema",
    "wma",
    "hma",
    "vwma",
    "volume_sma",
    "rsi",
    "adx",
    "atr",
    "atr_ratio",
    "macd",
    "macd_signal",
    "macd_hist",
    "bb_high",
    "bb_mid",
    "bb_low",
];

#[derive(Debug, Deserialize)]
struct StrategyDef {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    operands: HashMap<String, OperandDef>,
    #[serde(default)]
    conditions: Vec<ConditionDef>,
}

#[derive(Debug, Deserialize)]
struct ConditionDef {
    lhs: OperandDef,
    operator: String,
    rhs: OperandDef,
    tolerance: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OperandDef {
    Indicator {
        name: String,
        #[serde(default)]
        params: HashMap<String, f64>,
        #[serde(default)]
        timeframe: Timeframe,
        #[serde(default)]
        offset: usize,
        multiplier: Option<f64>,
        add_offset: Option<f64>,
    },
    Value {
        value: f64,
    },
    Ref {
        id: String,
    },
}

/// Parse and validate a strategy from its JSON text.
pub fn parse(json: &str) -> Result<Strategy, DefinitionError> {
    let def: StrategyDef = serde_json::from_str(json).map_err(|e| DefinitionError::Json {
        reason: e.to_string(),
    })?;
    convert(def)
}

/// Load a strategy from a JSON file.
pub fn load_file(path: &Path) -> Result<Strategy, ScreenerError> {
    let content = fs::read_to_string(path)?;
    Ok(parse(&content)?)
}

fn convert(def: StrategyDef) -> Result<Strategy, DefinitionError> {
    if def.conditions.is_empty() {
        return Err(DefinitionError::NoConditions);
    }

    let mut operands = HashMap::with_capacity(def.operands.len());
    for (id, operand_def) in &def.operands {
        operands.insert(id.clone(), convert_operand(operand_def)?);
    }

    let mut conditions = Vec::with_capacity(def.conditions.len());
    for cond in &def.conditions {
        let tolerance_pct = match cond.tolerance {
            None => DEFAULT_TOLERANCE_PCT,
            Some(t) if t.is_finite() && t > 0.0 => t,
            Some(t) => return Err(DefinitionError::InvalidTolerance { value: t }),
        };
        conditions.push(Condition {
            lhs: convert_operand(&cond.lhs)?,
            comparator: parse_operator(&cond.operator)?,
            rhs: convert_operand(&cond.rhs)?,
            tolerance_pct,
        });
    }

    let strategy = Strategy {
        name: def.name,
        description: def.description,
        operands,
        conditions,
    };
    validate_refs(&strategy)?;
    Ok(strategy)
}

fn parse_operator(operator: &str) -> Result<Comparator, DefinitionError> {
    match operator.trim() {
        ">" => Ok(Comparator::Gt),
        "<" => Ok(Comparator::Lt),
        ">=" => Ok(Comparator::Ge),
        "<=" => Ok(Comparator::Le),
        "==" | "=" => Ok(Comparator::Eq),
        "!=" => Ok(Comparator::Ne),
        "approx" | "≈" | "≈ (approx)" => Ok(Comparator::Approx),
        other => Err(DefinitionError::UnknownOperator {
            operator: other.to_string(),
        }),
    }
}

fn convert_operand(def: &OperandDef) -> Result<Operand, DefinitionError> {
    match def {
        OperandDef::Value { value } => Ok(Operand::Constant(*value)),
        OperandDef::Ref { id } => Ok(Operand::Ref { id: id.clone() }),
        OperandDef::Indicator {
            name,
            params,
            timeframe,
            offset,
            multiplier,
            add_offset,
        } => {
            let scale = Scale {
                multiplier: multiplier.unwrap_or(1.0),
                add_offset: add_offset.unwrap_or(0.0),
            };
            indicator_operand(name, params, *timeframe, *offset, scale)
        }
    }
}

/// The indicator registry: maps a JSON indicator name + params to its typed
/// operand. Unknown names and malformed params fail here, at load time.
fn indicator_operand(
    name_raw: &str,
    params: &HashMap<String, f64>,
    timeframe: Timeframe,
    offset: usize,
    scale: Scale,
) -> Result<Operand, DefinitionError> {
    let name = name_raw.trim().to_lowercase();

    let price = |field: PriceField| Operand::Price {
        field,
        timeframe,
        offset,
        scale,
    };
    let indicator = |indicator: IndicatorType, field: IndicatorField| Operand::Indicator {
        indicator,
        field,
        timeframe,
        offset,
        scale,
    };

    let operand = match name.as_str() {
        "open" => price(PriceField::Open),
        "high" => price(PriceField::High),
        "low" => price(PriceField::Low),
        "close" => price(PriceField::Close),
        "volume" => price(PriceField::Volume),
        "volume_turnover" | "turnover" => price(PriceField::Turnover),

        "sma" => indicator(
            IndicatorType::Sma(period_param(&name, params, DEFAULT_MA_PERIOD)?),
            IndicatorField::Value,
        ),
        "ema" => indicator(
            IndicatorType::Ema(period_param(&name, params, DEFAULT_MA_PERIOD)?),
            IndicatorField::Value,
        ),
        "wma" => indicator(
            IndicatorType::Wma(period_param(&name, params, DEFAULT_MA_PERIOD)?),
            IndicatorField::Value,
        ),
        "hma" => indicator(
            IndicatorType::Hma(period_param(&name, params, DEFAULT_MA_PERIOD)?),
            IndicatorField::Value,
        ),
        "vwma" => indicator(
            IndicatorType::Vwma(period_param(&name, params, DEFAULT_MA_PERIOD)?),
            IndicatorField::Value,
        ),
        "volume_sma" => indicator(
            IndicatorType::VolumeSma(period_param(&name, params, DEFAULT_MA_PERIOD)?),
            IndicatorField::Value,
        ),

        "rsi" => indicator(
            IndicatorType::Rsi(period_param(&name, params, DEFAULT_MOMENTUM_PERIOD)?),
            IndicatorField::Value,
        ),
        "adx" => indicator(
            IndicatorType::Adx(period_param(&name, params, DEFAULT_MOMENTUM_PERIOD)?),
            IndicatorField::Value,
        ),
        "atr" => indicator(
            IndicatorType::Atr(period_param(&name, params, DEFAULT_MOMENTUM_PERIOD)?),
            IndicatorField::Value,
        ),
        "atr_ratio" => indicator(
            IndicatorType::AtrRatio(period_param(&name, params, DEFAULT_MOMENTUM_PERIOD)?),
            IndicatorField::Value,
        ),

        "macd" => indicator(macd_type(&name, params)?, IndicatorField::MacdLine),
        "macd_signal" => indicator(macd_type(&name, params)?, IndicatorField::MacdSignal),
        "macd_hist" | "macd_histogram" => {
            indicator(macd_type(&name, params)?, IndicatorField::MacdHistogram)
        }

        "bb_high" => indicator(bollinger_type(&name, params)?, IndicatorField::BollingerUpper),
        "bb_mid" => indicator(bollinger_type(&name, params)?, IndicatorField::BollingerMiddle),
        "bb_low" => indicator(bollinger_type(&name, params)?, IndicatorField::BollingerLower),

        _ => {
            return Err(DefinitionError::UnknownIndicator {
                name: name_raw.to_string(),
            });
        }
    };

    Ok(operand)
}

fn macd_type(name: &str, params: &HashMap<String, f64>) -> Result<IndicatorType, DefinitionError> {
    if params.contains_key("period") {
        return Err(DefinitionError::InvalidParam {
            name: name.to_string(),
            param: "period".to_string(),
            reason: "MACD takes 'fast', 'slow' and 'signal'".to_string(),
        });
    }
    let fast = named_period(name, "fast", params, DEFAULT_FAST)?;
    let slow = named_period(name, "slow", params, DEFAULT_SLOW)?;
    let signal = named_period(name, "signal", params, DEFAULT_SIGNAL)?;
    if fast >= slow {
        return Err(DefinitionError::InvalidParam {
            name: name.to_string(),
            param: "fast".to_string(),
            reason: format!("'fast' ({fast}) must be less than 'slow' ({slow})"),
        });
    }
    Ok(IndicatorType::Macd { fast, slow, signal })
}

fn bollinger_type(
    name: &str,
    params: &HashMap<String, f64>,
) -> Result<IndicatorType, DefinitionError> {
    let period = period_param(name, params, DEFAULT_MA_PERIOD)?;
    let stddev_mult_x100 = match params.get("stddev") {
        None => DEFAULT_STDDEV_MULT_X100,
        Some(&mult) if mult.is_finite() && mult > 0.0 => (mult * 100.0).round() as u32,
        Some(&mult) => {
            return Err(DefinitionError::InvalidParam {
                name: name.to_string(),
                param: "stddev".to_string(),
                reason: format!("must be a positive number, got {mult}"),
            });
        }
    };
    Ok(IndicatorType::Bollinger {
        period,
        stddev_mult_x100,
    })
}

fn period_param(
    name: &str,
    params: &HashMap<String, f64>,
    default: usize,
) -> Result<usize, DefinitionError> {
    named_period(name, "period", params, default)
}

fn named_period(
    name: &str,
    param: &str,
    params: &HashMap<String, f64>,
    default: usize,
) -> Result<usize, DefinitionError> {
    match params.get(param) {
        None => Ok(default),
        Some(&value) if value.is_finite() && value >= 1.0 && value.fract() == 0.0 => {
            Ok(value as usize)
        }
        Some(&value) => Err(DefinitionError::InvalidParam {
            name: name.to_string(),
            param: param.to_string(),
            reason: format!("must be a positive integer, got {value}"),
        }),
    }
}

/// Every `Ref` must target a defined named operand, and the reference graph
/// among named operands must be acyclic. Detected by DFS with a
/// visiting/visited state per id.
fn validate_refs(strategy: &Strategy) -> Result<(), DefinitionError> {
    let check_exists = |operand: &Operand| -> Result<(), DefinitionError> {
        if let Operand::Ref { id } = operand {
            if !strategy.operands.contains_key(id) {
                return Err(DefinitionError::UnknownRef { id: id.clone() });
            }
        }
        Ok(())
    };

    for cond in &strategy.conditions {
        check_exists(&cond.lhs)?;
        check_exists(&cond.rhs)?;
    }
    for operand in strategy.operands.values() {
        check_exists(operand)?;
    }

    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Visiting,
        Done,
    }

    fn visit(
        id: &str,
        operands: &HashMap<String, Operand>,
        state: &mut HashMap<String, State>,
    ) -> Result<(), DefinitionError> {
        match state.get(id) {
            Some(State::Done) => return Ok(()),
            Some(State::Visiting) => {
                return Err(DefinitionError::CyclicRef { id: id.to_string() });
            }
            None => {}
        }
        state.insert(id.to_string(), State::Visiting);
        if let Some(Operand::Ref { id: target }) = operands.get(id) {
            visit(target, operands, state)?;
        }
        state.insert(id.to_string(), State::Done);
        Ok(())
    }

    let mut state = HashMap::new();
    for id in strategy.operands.keys() {
        visit(id, &strategy.operands, &mut state)?;
    }
    Ok(())
}
