//! Ticker symbols.

use std::fmt;

use super::error::LedgerError;

/// Width of the `symbol` column in the ledger schema.
pub const MAX_SYMBOL_LEN: usize = 16;

/// A normalized ticker symbol: trimmed, uppercase, non-empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Parse user input into a symbol. Lookups are case-insensitive, so the
    /// input is uppercased here once and every later comparison is exact.
    pub fn parse(input: &str) -> Result<Self, LedgerError> {
        let normalized = input.trim().to_uppercase();
        if normalized.is_empty()
            || normalized.len() > MAX_SYMBOL_LEN
            || !normalized.chars().all(is_symbol_char)
        {
            return Err(LedgerError::unknown_symbol(input.trim()));
        }
        Ok(Symbol(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
