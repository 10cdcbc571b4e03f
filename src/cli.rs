//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::ScreenerError;
use crate::domain::eval::{ConditionOutcome, Verdict};
use crate::domain::screen::{ScreenOptions, ScreenReport, run_screen};
use crate::domain::strategy::Strategy;
use crate::domain::strategy_parser::{self, INDICATOR_NAMES};
use crate::domain::universe::parse_symbols;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "stocksift", about = "JSON-strategy stock screener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a strategy over the symbol universe
    Screen {
        #[arg(short, long)]
        config: PathBuf,
        /// Strategy JSON file (overrides [screen] strategy)
        #[arg(short, long)]
        strategy: Option<PathBuf>,
        /// Comma-separated symbols (overrides [screen] symbols)
        #[arg(long)]
        symbols: Option<String>,
        /// Stop after this many matches
        #[arg(long)]
        limit: Option<usize>,
        /// Print matched symbols only
        #[arg(long)]
        matches_only: bool,
    },
    /// Validate a strategy JSON file
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// List supported indicator names
    Indicators,
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Screen {
            config,
            strategy,
            symbols,
            limit,
            matches_only,
        } => run_screen_command(
            &config,
            strategy.as_ref(),
            symbols.as_deref(),
            limit,
            matches_only,
        ),
        Command::Validate { strategy } => run_validate(&strategy),
        Command::Indicators => run_indicators(),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = ScreenerError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_screen_command(
    config_path: &PathBuf,
    strategy_path: Option<&PathBuf>,
    symbols_override: Option<&str>,
    limit_override: Option<usize>,
    matches_only: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let data_dir = match config.get_string("screen", "data_dir") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let err = ScreenerError::ConfigMissing {
                section: "screen".into(),
                key: "data_dir".into(),
            };
            eprintln!("error: {err}");
            return ExitCode::from(&err);
        }
    };

    let strategy_file = match strategy_path {
        Some(path) => path.clone(),
        None => match config.get_string("screen", "strategy") {
            Some(path) => PathBuf::from(path),
            None => {
                let err = ScreenerError::ConfigMissing {
                    section: "screen".into(),
                    key: "strategy".into(),
                };
                eprintln!("error: {err}");
                return ExitCode::from(&err);
            }
        },
    };

    eprintln!("Loading strategy from {}", strategy_file.display());
    let strategy = match strategy_parser::load_file(&strategy_file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };
    eprintln!("Strategy: {} ({} conditions)", strategy.name, strategy.conditions.len());

    let data_port = CsvAdapter::new(data_dir);

    let symbols = {
        let configured = symbols_override
            .map(str::to_string)
            .or_else(|| config.get_string("screen", "symbols"));
        match configured {
            Some(list) => match parse_symbols(&list) {
                Ok(symbols) => symbols,
                Err(e) => {
                    let err = ScreenerError::ConfigInvalid {
                        section: "screen".into(),
                        key: "symbols".into(),
                        reason: e.to_string(),
                    };
                    eprintln!("error: {err}");
                    return ExitCode::from(&err);
                }
            },
            None => match data_port.list_symbols() {
                Ok(symbols) if !symbols.is_empty() => symbols,
                Ok(_) => {
                    eprintln!("error: no symbols configured and data directory is empty");
                    return ExitCode::from(3);
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    return ExitCode::from(&e);
                }
            },
        }
    };

    let max_matches = limit_override.or_else(|| {
        let configured = config.get_int("screen", "max_matches", 0);
        (configured > 0).then_some(configured as usize)
    });

    eprintln!("Screening {} symbols...", symbols.len());
    let options = ScreenOptions {
        max_matches,
        stop: None,
    };
    let report = run_screen(&data_port, &symbols, &strategy, &options);

    print_report(&report, &strategy, matches_only);
    ExitCode::SUCCESS
}

fn print_report(report: &ScreenReport, strategy: &Strategy, matches_only: bool) {
    println!("{:<14} {:<28} CONDITIONS", "SYMBOL", "VERDICT");
    for row in &report.rows {
        if matches_only && row.evaluation.verdict != Verdict::Matched {
            continue;
        }
        let conditions: Vec<String> = row
            .evaluation
            .conditions
            .iter()
            .map(|r| {
                let comparator = &strategy.conditions[r.index].comparator;
                format!(
                    "{} {} {} [{}]",
                    format_value(r.lhs),
                    comparator,
                    format_value(r.rhs),
                    outcome_label(r.outcome)
                )
            })
            .collect();
        println!(
            "{:<14} {:<28} {}",
            row.symbol,
            row.evaluation.verdict.to_string(),
            conditions.join("; ")
        );
    }

    let evaluated = report.rows.len();
    eprintln!(
        "{} matched of {} evaluated{}",
        report.matched,
        evaluated,
        if report.stopped_early {
            " (stopped early)"
        } else {
            ""
        }
    );
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.4}", v),
        None => "n/a".to_string(),
    }
}

fn outcome_label(outcome: ConditionOutcome) -> &'static str {
    match outcome {
        ConditionOutcome::Pass => "pass",
        ConditionOutcome::Fail => "fail",
        ConditionOutcome::Undecidable => "undecidable",
    }
}

fn run_validate(strategy_path: &PathBuf) -> ExitCode {
    match strategy_parser::load_file(strategy_path) {
        Ok(strategy) => {
            println!(
                "strategy '{}' is valid ({} conditions, {} named operands)",
                strategy.name,
                strategy.conditions.len(),
                strategy.operands.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_indicators() -> ExitCode {
    for name in INDICATOR_NAMES {
        println!("{name}");
    }
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data_dir = match config.get_string("screen", "data_dir") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let err = ScreenerError::ConfigMissing {
                section: "screen".into(),
                key: "data_dir".into(),
            };
            eprintln!("error: {err}");
            return ExitCode::from(&err);
        }
    };

    match CsvAdapter::new(data_dir).list_symbols() {
        Ok(symbols) => {
            for symbol in symbols {
                println!("{symbol}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}
