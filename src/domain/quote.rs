//! Quotes from the external price provider.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::money::{format_usd, to_cents};
use super::symbol::Symbol;
use crate::ports::quote_port::{QuoteError, QuotePort};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub symbol: Symbol,
    pub name: String,
    pub price: Decimal,
}

impl Quote {
    /// A price that rounds to zero cents or below cannot be settled.
    pub fn is_tradable(&self) -> bool {
        self.settlement_price() > Decimal::ZERO
    }

    /// Price per share rounded to the cents the ledger stores.
    pub fn settlement_price(&self) -> Decimal {
        to_cents(self.price)
    }

    pub fn describe(&self) -> String {
        format!(
            "A share of {} ({}) costs {}",
            self.name,
            self.symbol,
            format_usd(self.price)
        )
    }
}

/// Look up a tradable quote, folding every provider failure into `UnknownSymbol`.
pub fn resolve_quote(quotes: &dyn QuotePort, symbol: &Symbol) -> Result<Quote, LedgerError> {
    match quotes.lookup(symbol) {
        Ok(quote) if quote.is_tradable() => Ok(quote),
        Ok(quote) => {
            log::warn!("quote for {} has no settleable price ({})", symbol, quote.price);
            Err(LedgerError::unknown_symbol(symbol.as_str()))
        }
        Err(QuoteError::NotFound { .. }) => Err(LedgerError::unknown_symbol(symbol.as_str())),
        Err(QuoteError::Unavailable { reason }) => {
            log::warn!("quote lookup for {} failed: {}", symbol, reason);
            Err(LedgerError::unknown_symbol(symbol.as_str()))
        }
    }
}

/// Quote raw user input, e.g. from the quote command.
pub fn lookup_quote(quotes: &dyn QuotePort, input: &str) -> Result<Quote, LedgerError> {
    let symbol = Symbol::parse(input)?;
    log::debug!("looking up quote for {}", symbol);
    resolve_quote(quotes, &symbol)
}
