mod common;

use common::*;
use papertrade::domain::settlement::SettlementEngine;
use papertrade::domain::trade::TradeOrder;
use papertrade::domain::valuation::{net_worth, portfolio_view, value_account};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn net_worth_of_fresh_account_is_cash() {
    let ledger = new_ledger();
    let quotes = MockQuotePort::new();
    let session = open_account(&ledger, "alice", dec!(10000.00));

    assert_eq!(net_worth(&ledger, &quotes, &session).unwrap(), dec!(10000.00));
    assert!(portfolio_view(&ledger, &quotes, &session).unwrap().is_empty());
}

#[test]
fn net_worth_follows_current_prices() {
    let ledger = new_ledger();
    let quotes = MockQuotePort::new()
        .with_price("AAA", "Triple A", dec!(100.00))
        .with_price("BBB", "Double B", dec!(2.50));
    let session = open_account(&ledger, "alice", dec!(10000.00));
    let engine = SettlementEngine::new(&ledger, &quotes);
    engine.execute_trade(&session, &TradeOrder::buy("AAA", 10)).unwrap();
    engine.execute_trade(&session, &TradeOrder::buy("BBB", 40)).unwrap();

    // 10000 - 1000 - 100 cash, 1000 + 100 holdings
    assert_eq!(net_worth(&ledger, &quotes, &session).unwrap(), dec!(10000.00));

    quotes.set_price("AAA", dec!(150.00));
    assert_eq!(net_worth(&ledger, &quotes, &session).unwrap(), dec!(10500.00));

    quotes.set_price("BBB", dec!(2.00));
    let valuation = value_account(&ledger, &quotes, &session).unwrap();
    assert_eq!(valuation.cash, dec!(8900.00));
    assert_eq!(valuation.holdings_value, dec!(1580.00));
    assert_eq!(valuation.net_worth, dec!(10480.00));
    assert!(valuation.is_complete());
}

#[test]
fn view_is_sorted_and_skips_closed_positions() {
    let ledger = new_ledger();
    let quotes = MockQuotePort::new()
        .with_price("MSFT", "Microsoft", dec!(400.00))
        .with_price("AAPL", "Apple", dec!(190.00))
        .with_price("GOOG", "Alphabet", dec!(150.00));
    let session = open_account(&ledger, "alice", dec!(10000.00));
    let engine = SettlementEngine::new(&ledger, &quotes);
    engine.execute_trade(&session, &TradeOrder::buy("MSFT", 2)).unwrap();
    engine.execute_trade(&session, &TradeOrder::buy("GOOG", 3)).unwrap();
    engine.execute_trade(&session, &TradeOrder::buy("AAPL", 1)).unwrap();
    engine.execute_trade(&session, &TradeOrder::sell("GOOG", 3)).unwrap();

    let view = portfolio_view(&ledger, &quotes, &session).unwrap();
    let rows: Vec<(&str, i64, Option<Decimal>)> = view
        .iter()
        .map(|p| (p.symbol.as_str(), p.share_count, p.value))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("AAPL", 1, Some(dec!(190.00))),
            ("MSFT", 2, Some(dec!(800.00))),
        ]
    );
    assert_eq!(view[0].name.as_deref(), Some("Apple"));
}

#[test]
fn unavailable_quote_is_flagged_and_left_out() {
    let ledger = new_ledger();
    let quotes = MockQuotePort::new()
        .with_price("AAA", "Triple A", dec!(100.00))
        .with_price("ZZZ", "Zed", dec!(10.00));
    let session = open_account(&ledger, "alice", dec!(10000.00));
    let engine = SettlementEngine::new(&ledger, &quotes);
    engine.execute_trade(&session, &TradeOrder::buy("AAA", 1)).unwrap();
    engine.execute_trade(&session, &TradeOrder::buy("ZZZ", 5)).unwrap();

    quotes.set_unavailable("ZZZ");
    let valuation = value_account(&ledger, &quotes, &session).unwrap();

    assert_eq!(valuation.positions.len(), 2);
    let zzz = &valuation.positions[1];
    assert!(zzz.price_unknown());
    assert_eq!(zzz.share_count, 5);
    assert_eq!(zzz.value, None);

    assert_eq!(valuation.cash, dec!(9850.00));
    assert_eq!(valuation.net_worth, dec!(9950.00));
    let unpriced: Vec<&str> = valuation.unpriced().map(|s| s.as_str()).collect();
    assert_eq!(unpriced, vec!["ZZZ"]);
}

#[test]
fn every_valuation_requotes() {
    let ledger = new_ledger();
    let quotes = MockQuotePort::new().with_price("AAA", "Triple A", dec!(1.00));
    let session = open_account(&ledger, "alice", dec!(100.00));
    SettlementEngine::new(&ledger, &quotes)
        .execute_trade(&session, &TradeOrder::buy("AAA", 1))
        .unwrap();

    let before = quotes.calls();
    net_worth(&ledger, &quotes, &session).unwrap();
    net_worth(&ledger, &quotes, &session).unwrap();
    assert_eq!(quotes.calls() - before, 2);
}
