//! Trade settlement.
//!
//! [`plan`] is the pure bookkeeping step: given the balance and holding read inside
//! a storage transaction, it validates the order and computes the post-trade state.
//! [`SettlementEngine`] drives a whole trade: quantity check, quote lookup, then
//! an atomic [`LedgerPort::settle`] that calls back into [`plan`].

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::money::line_value;
use super::quote::resolve_quote;
use super::session::Session;
use super::symbol::Symbol;
use super::trade::{PricedOrder, Side, TradeOrder, TradeRecord};
use crate::ports::ledger_port::LedgerPort;
use crate::ports::quote_port::QuotePort;

/// Post-trade state for one account and one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementPlan {
    pub cash_after: Decimal,
    pub shares_after: i64,
    /// Cash moved by the trade, always positive.
    pub amount: Decimal,
}

/// Validate `order` against the current `cash` and `held` shares and compute the
/// resulting balance and share count.
///
/// Buys need `price * quantity` strictly below `cash`; spending the balance down
/// to exactly zero is rejected. Sells need `quantity <= held`.
pub fn plan(cash: Decimal, held: i64, order: &PricedOrder) -> Result<SettlementPlan, LedgerError> {
    if order.quantity <= 0 {
        return Err(LedgerError::InvalidQuantity {
            quantity: order.quantity,
        });
    }

    let amount = line_value(order.price, order.quantity).ok_or(LedgerError::InvalidQuantity {
        quantity: order.quantity,
    })?;

    match order.side {
        Side::Buy => {
            if amount >= cash {
                return Err(LedgerError::InsufficientFunds {
                    required: amount,
                    available: cash,
                });
            }
            let shares_after = held.checked_add(order.quantity).ok_or(
                LedgerError::InvalidQuantity {
                    quantity: order.quantity,
                },
            )?;
            Ok(SettlementPlan {
                cash_after: cash - amount,
                shares_after,
                amount,
            })
        }
        Side::Sell => {
            if order.quantity > held {
                return Err(LedgerError::InsufficientShares {
                    symbol: order.symbol.to_string(),
                    held,
                    requested: order.quantity,
                });
            }
            let cash_after = cash.checked_add(amount).ok_or(LedgerError::InvalidQuantity {
                quantity: order.quantity,
            })?;
            Ok(SettlementPlan {
                cash_after,
                shares_after: held - order.quantity,
                amount,
            })
        }
    }
}

/// Outcome of a committed trade, handed back to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeReceipt {
    pub record: TradeRecord,
    pub name: String,
}

impl TradeReceipt {
    pub fn message(&self) -> &'static str {
        match self.record.side {
            Side::Buy => "Bought!",
            Side::Sell => "Sold!",
        }
    }
}

pub struct SettlementEngine<'a> {
    ledger: &'a dyn LedgerPort,
    quotes: &'a dyn QuotePort,
}

impl<'a> SettlementEngine<'a> {
    pub fn new(ledger: &'a dyn LedgerPort, quotes: &'a dyn QuotePort) -> Self {
        Self { ledger, quotes }
    }

    /// Execute one buy or sell for the session's account.
    ///
    /// On success exactly one history row was appended, the cash balance and the
    /// position were updated in the same transaction. On error nothing changed.
    pub fn execute_trade(
        &self,
        session: &Session,
        order: &TradeOrder,
    ) -> Result<TradeReceipt, LedgerError> {
        if order.quantity <= 0 {
            return Err(LedgerError::InvalidQuantity {
                quantity: order.quantity,
            });
        }

        let symbol = Symbol::parse(&order.symbol)?;
        let quote = resolve_quote(self.quotes, &symbol)?;
        log::debug!(
            "{} {} x{} at {} for account {}",
            order.side,
            symbol,
            order.quantity,
            quote.price,
            session.account_id()
        );

        let priced = PricedOrder {
            symbol,
            side: order.side,
            quantity: order.quantity,
            price: quote.settlement_price(),
        };

        let record = self.ledger.settle(session.account_id(), &priced)?;
        log::info!(
            "settled trade {}: account {} {} {} x{} at {}",
            record.id,
            record.account_id,
            record.side,
            record.symbol,
            record.share_count,
            record.stock_price
        );

        Ok(TradeReceipt {
            record,
            name: quote.name,
        })
    }
}
