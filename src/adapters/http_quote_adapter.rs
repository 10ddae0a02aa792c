//! HTTP JSON quote adapter.
//!
//! `GET {base_url}/{SYMBOL}[?apikey=...]` returning
//! `{"symbol": "...", "name": "...", "price": 123.45}`.

use crate::domain::config_validation::quote_timeout;
use crate::domain::error::LedgerError;
use crate::domain::quote::Quote;
use crate::domain::symbol::Symbol;
use crate::ports::config_port::ConfigPort;
use crate::ports::quote_port::{QuoteError, QuotePort};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    symbol: Option<String>,
    name: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    price: Decimal,
}

pub struct HttpQuoteAdapter {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpQuoteAdapter {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::ConfigInvalid {
                section: "quotes".into(),
                key: "base_url".into(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, LedgerError> {
        let base_url =
            config
                .get_string("quotes", "base_url")
                .ok_or_else(|| LedgerError::ConfigMissing {
                    section: "quotes".into(),
                    key: "base_url".into(),
                })?;
        Self::new(
            &base_url,
            config.get_string("quotes", "api_key"),
            quote_timeout(config)?,
        )
    }

    fn url_for(&self, symbol: &Symbol) -> String {
        format!("{}/{}", self.base_url, symbol)
    }
}

fn parse_response(symbol: &Symbol, body: &str) -> Result<Quote, QuoteError> {
    let response: QuoteResponse =
        serde_json::from_str(body).map_err(|e| QuoteError::Unavailable {
            reason: format!("malformed quote for {}: {}", symbol, e),
        })?;

    if let Some(returned) = response.symbol.as_deref() {
        if !returned.eq_ignore_ascii_case(symbol.as_str()) {
            return Err(QuoteError::Unavailable {
                reason: format!("asked for {} but got a quote for {}", symbol, returned),
            });
        }
    }

    Ok(Quote {
        symbol: symbol.clone(),
        name: response.name,
        price: response.price,
    })
}

impl QuotePort for HttpQuoteAdapter {
    fn lookup(&self, symbol: &Symbol) -> Result<Quote, QuoteError> {
        let mut request = self.client.get(self.url_for(symbol));
        if let Some(key) = &self.api_key {
            request = request.query(&[("apikey", key)]);
        }

        let response = request.send().map_err(|e| QuoteError::Unavailable {
            reason: format!("request for {} failed: {}", symbol, e),
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(QuoteError::NotFound {
                    symbol: symbol.to_string(),
                });
            }
            status if !status.is_success() => {
                return Err(QuoteError::Unavailable {
                    reason: format!("quote source returned {} for {}", status, symbol),
                });
            }
            _ => {}
        }

        let body = response.text().map_err(|e| QuoteError::Unavailable {
            reason: format!("failed to read quote body for {}: {}", symbol, e),
        })?;
        parse_response(symbol, &body)
    }
}
