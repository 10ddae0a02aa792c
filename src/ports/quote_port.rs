//! Price quote port trait.

use crate::domain::quote::Quote;
use crate::domain::symbol::Symbol;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    #[error("no quote for {symbol}")]
    NotFound { symbol: String },

    #[error("quote source unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Port for looking up the current price of a symbol.
///
/// Every call must hit the source fresh; callers rely on that for valuation.
pub trait QuotePort {
    fn lookup(&self, symbol: &Symbol) -> Result<Quote, QuoteError>;
}

impl<Q: QuotePort + ?Sized> QuotePort for &Q {
    fn lookup(&self, symbol: &Symbol) -> Result<Quote, QuoteError> {
        (**self).lookup(symbol)
    }
}

impl<Q: QuotePort + ?Sized> QuotePort for Box<Q> {
    fn lookup(&self, symbol: &Symbol) -> Result<Quote, QuoteError> {
        (**self).lookup(symbol)
    }
}
