//! Trade intents and the append-only trade record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use super::account::AccountId;
use super::symbol::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trade type: {0}")]
pub struct ParseSideError(pub String);

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(ParseSideError(other.to_string())),
        }
    }
}

/// What the user asked for, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeOrder {
    pub symbol: String,
    pub quantity: i64,
    pub side: Side,
}

impl TradeOrder {
    pub fn buy(symbol: impl Into<String>, quantity: i64) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            side: Side::Buy,
        }
    }

    pub fn sell(symbol: impl Into<String>, quantity: i64) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            side: Side::Sell,
        }
    }
}

/// A validated order carrying the quoted price it will settle at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: i64,
    /// Price per share, in cents.
    pub price: Decimal,
}

/// One executed trade. Written once, never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRecord {
    pub id: i64,
    pub account_id: AccountId,
    pub symbol: Symbol,
    pub stock_price: Decimal,
    pub share_count: i64,
    pub side: Side,
    pub timestamp: DateTime<Utc>,
}

impl TradeRecord {
    pub fn total(&self) -> Decimal {
        self.stock_price * Decimal::from(self.share_count)
    }
}
