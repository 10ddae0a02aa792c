#![allow(dead_code)]

use papertrade::adapters::sqlite_adapter::SqliteLedger;
use papertrade::domain::accounts;
use papertrade::domain::quote::Quote;
use papertrade::domain::session::Session;
use papertrade::domain::symbol::Symbol;
use papertrade::ports::quote_port::{QuoteError, QuotePort};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const PASSWORD: &str = "correct horse battery staple";

/// Quote source whose prices can be changed between calls.
pub struct MockQuotePort {
    quotes: Mutex<HashMap<String, Result<Quote, QuoteError>>>,
    calls: AtomicUsize,
}

impl MockQuotePort {
    pub fn new() -> Self {
        Self {
            quotes: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_price(self, symbol: &str, name: &str, price: Decimal) -> Self {
        self.insert(symbol, name, price);
        self
    }

    fn insert(&self, symbol: &str, name: &str, price: Decimal) {
        let quote = Quote {
            symbol: Symbol::parse(symbol).unwrap(),
            name: name.to_string(),
            price,
        };
        self.quotes
            .lock()
            .unwrap()
            .insert(symbol.to_uppercase(), Ok(quote));
    }

    pub fn set_price(&self, symbol: &str, price: Decimal) {
        let name = match self.quotes.lock().unwrap().get(&symbol.to_uppercase()) {
            Some(Ok(quote)) => quote.name.clone(),
            _ => format!("{} Corp", symbol),
        };
        self.insert(symbol, &name, price);
    }

    pub fn set_unavailable(&self, symbol: &str) {
        self.quotes.lock().unwrap().insert(
            symbol.to_uppercase(),
            Err(QuoteError::Unavailable {
                reason: "connection reset".into(),
            }),
        );
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QuotePort for MockQuotePort {
    fn lookup(&self, symbol: &Symbol) -> Result<Quote, QuoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.quotes
            .lock()
            .unwrap()
            .get(symbol.as_str())
            .cloned()
            .unwrap_or_else(|| {
                Err(QuoteError::NotFound {
                    symbol: symbol.to_string(),
                })
            })
    }
}

pub fn new_ledger() -> SqliteLedger {
    SqliteLedger::in_memory().unwrap()
}

/// Register `username` with [`PASSWORD`] and log in.
pub fn open_account(ledger: &SqliteLedger, username: &str, cash: Decimal) -> Session {
    accounts::register(ledger, username, PASSWORD, cash).unwrap();
    accounts::authenticate(ledger, username, PASSWORD).unwrap()
}
