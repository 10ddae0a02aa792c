//! Portfolio positions.

use rust_decimal::Decimal;

use super::money::line_value;
use super::symbol::Symbol;

/// A user's holding of one symbol. Unique per (account, symbol).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub symbol: Symbol,
    pub share_count: i64,
}

impl Position {
    /// Zero-count positions stay in storage but are hidden from views.
    pub fn is_open(&self) -> bool {
        self.share_count > 0
    }

    pub fn market_value(&self, price: Decimal) -> Option<Decimal> {
        line_value(price, self.share_count)
    }
}
