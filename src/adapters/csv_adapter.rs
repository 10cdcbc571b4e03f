//! CSV file data adapter.
//!
//! One file per symbol under a base directory (`{SYMBOL}.csv`), columns
//! `date,open,high,low,close,volume` with a header row, dates ascending —
//! the layout the fetch/cache collaborator writes.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_daily(&self, symbol: &str) -> Result<Vec<OhlcvBar>, ScreenerError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| ScreenerError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| ScreenerError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let field = |idx: usize, name: &str| -> Result<&str, ScreenerError> {
                record.get(idx).ok_or_else(|| ScreenerError::Data {
                    reason: format!("missing {} column", name),
                })
            };

            let date = NaiveDate::parse_from_str(field(0, "date")?, "%Y-%m-%d").map_err(|e| {
                ScreenerError::Data {
                    reason: format!("invalid date: {}", e),
                }
            })?;

            let number = |idx: usize, name: &str| -> Result<f64, ScreenerError> {
                field(idx, name)?.parse().map_err(|e| ScreenerError::Data {
                    reason: format!("invalid {} value: {}", name, e),
                })
            };

            let open = number(1, "open")?;
            let high = number(2, "high")?;
            let low = number(3, "low")?;
            let close = number(4, "close")?;
            let volume: i64 = field(5, "volume")?.parse().map_err(|e| ScreenerError::Data {
                reason: format!("invalid volume value: {}", e),
            })?;

            bars.push(OhlcvBar {
                symbol: symbol.to_string(),
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScreenerError> {
        let mut symbols = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    symbols.push(stem.to_string());
                }
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}
