//! CSV file quote adapter.
//!
//! Reads a `symbol,name,price` file with a header row. The file is re-read on
//! every lookup so edits show up immediately.

use crate::domain::error::LedgerError;
use crate::domain::quote::Quote;
use crate::domain::symbol::Symbol;
use crate::ports::config_port::ConfigPort;
use crate::ports::quote_port::{QuoteError, QuotePort};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvQuoteAdapter {
    path: PathBuf,
}

impl CsvQuoteAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, LedgerError> {
        let path = config
            .get_string("quotes", "csv_path")
            .ok_or_else(|| LedgerError::ConfigMissing {
                section: "quotes".into(),
                key: "csv_path".into(),
            })?;
        Ok(Self::new(PathBuf::from(path)))
    }
}

impl QuotePort for CsvQuoteAdapter {
    fn lookup(&self, symbol: &Symbol) -> Result<Quote, QuoteError> {
        let content = fs::read_to_string(&self.path).map_err(|e| QuoteError::Unavailable {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        for result in rdr.records() {
            let record = result.map_err(|e| QuoteError::Unavailable {
                reason: format!("CSV parse error: {}", e),
            })?;

            let Some(row_symbol) = record.get(0) else {
                continue;
            };
            if !row_symbol.eq_ignore_ascii_case(symbol.as_str()) {
                continue;
            }

            let name = record.get(1).unwrap_or_default();
            let price = record
                .get(2)
                .ok_or_else(|| QuoteError::Unavailable {
                    reason: format!("missing price column for {}", symbol),
                })
                .and_then(|raw| {
                    Decimal::from_str(raw).map_err(|e| QuoteError::Unavailable {
                        reason: format!("invalid price for {}: {}", symbol, e),
                    })
                })?;

            return Ok(Quote {
                symbol: symbol.clone(),
                name: if name.is_empty() {
                    symbol.to_string()
                } else {
                    name.to_string()
                },
                price,
            });
        }

        Err(QuoteError::NotFound {
            symbol: symbol.to_string(),
        })
    }
}
