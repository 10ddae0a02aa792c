//! Portfolio valuation and net worth.
//!
//! Read-only. Every call re-queries the quote source; a position whose quote
//! cannot be fetched is kept in the view with no price instead of failing the
//! whole valuation.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::position::Position;
use super::quote::resolve_quote;
use super::session::Session;
use super::symbol::Symbol;
use crate::ports::ledger_port::LedgerPort;
use crate::ports::quote_port::QuotePort;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionView {
    pub symbol: Symbol,
    pub name: Option<String>,
    pub share_count: i64,
    pub price: Option<Decimal>,
    pub value: Option<Decimal>,
}

impl PositionView {
    pub fn price_unknown(&self) -> bool {
        self.price.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Valuation {
    pub cash: Decimal,
    pub positions: Vec<PositionView>,
    /// Sum over priced positions only.
    pub holdings_value: Decimal,
    pub net_worth: Decimal,
}

impl Valuation {
    /// Symbols left out of `holdings_value` because no quote was available.
    pub fn unpriced(&self) -> impl Iterator<Item = &Symbol> {
        self.positions
            .iter()
            .filter(|p| p.price_unknown())
            .map(|p| &p.symbol)
    }

    pub fn is_complete(&self) -> bool {
        self.unpriced().next().is_none()
    }
}

/// Price each open position. Zero-count positions are dropped and the result is
/// sorted by symbol.
pub fn price_positions(quotes: &dyn QuotePort, positions: Vec<Position>) -> Vec<PositionView> {
    let mut views: Vec<PositionView> = positions
        .into_iter()
        .filter(Position::is_open)
        .map(|pos| match resolve_quote(quotes, &pos.symbol) {
            Ok(quote) => {
                let value = pos.market_value(quote.price);
                PositionView {
                    name: Some(quote.name),
                    share_count: pos.share_count,
                    price: value.map(|_| quote.price),
                    value,
                    symbol: pos.symbol,
                }
            }
            Err(_) => PositionView {
                symbol: pos.symbol,
                name: None,
                share_count: pos.share_count,
                price: None,
                value: None,
            },
        })
        .collect();
    views.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    views
}

/// Combine cash with priced positions.
pub fn summarize(cash: Decimal, positions: Vec<PositionView>) -> Valuation {
    let holdings_value: Decimal = positions.iter().filter_map(|p| p.value).sum();
    Valuation {
        cash,
        net_worth: cash + holdings_value,
        holdings_value,
        positions,
    }
}

pub fn portfolio_view(
    ledger: &dyn LedgerPort,
    quotes: &dyn QuotePort,
    session: &Session,
) -> Result<Vec<PositionView>, LedgerError> {
    let positions = ledger.open_positions(session.account_id())?;
    Ok(price_positions(quotes, positions))
}

/// Cash, every open position at its current price, and the resulting net worth.
pub fn value_account(
    ledger: &dyn LedgerPort,
    quotes: &dyn QuotePort,
    session: &Session,
) -> Result<Valuation, LedgerError> {
    let account = ledger
        .find_account(session.account_id())?
        .ok_or(LedgerError::AccountNotFound {
            id: session.account_id().0,
        })?;
    let positions = ledger.open_positions(account.id)?;
    let valuation = summarize(account.cash, price_positions(quotes, positions));

    for symbol in valuation.unpriced() {
        log::warn!("no price for {} in valuation of account {}", symbol, account.id);
    }
    Ok(valuation)
}

/// `cash + Σ share_count * price` over the positions that could be priced.
pub fn net_worth(
    ledger: &dyn LedgerPort,
    quotes: &dyn QuotePort,
    session: &Session,
) -> Result<Decimal, LedgerError> {
    value_account(ledger, quotes, session).map(|v| v.net_worth)
}
