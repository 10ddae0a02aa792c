//! Retry wrapper for flaky quote sources.

use backon::{BlockingRetryable, ExponentialBuilder};
use std::time::Duration;

use crate::domain::quote::Quote;
use crate::domain::symbol::Symbol;
use crate::ports::quote_port::{QuoteError, QuotePort};

const QUOTE_RETRY_INITIAL_DELAY: Duration = Duration::from_millis(100);
const QUOTE_RETRY_MAX_DELAY: Duration = Duration::from_secs(2);

/// Retries `Unavailable` lookups up to `retries` extra times with exponential
/// backoff. `NotFound` is final and returned immediately.
pub struct RetryingQuoteAdapter<Q> {
    inner: Q,
    retries: usize,
    initial_delay: Duration,
}

impl<Q: QuotePort> RetryingQuoteAdapter<Q> {
    pub fn new(inner: Q, retries: u32) -> Self {
        Self {
            inner,
            retries: retries as usize,
            initial_delay: QUOTE_RETRY_INITIAL_DELAY,
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_max_delay(QUOTE_RETRY_MAX_DELAY)
            .with_max_times(self.retries)
    }
}

impl<Q: QuotePort> QuotePort for RetryingQuoteAdapter<Q> {
    fn lookup(&self, symbol: &Symbol) -> Result<Quote, QuoteError> {
        (|| self.inner.lookup(symbol))
            .retry(self.backoff())
            .sleep(std::thread::sleep)
            .when(|e| matches!(e, QuoteError::Unavailable { .. }))
            .notify(|e, delay| {
                log::debug!("quote lookup for {} failed ({}), retrying in {:?}", symbol, e, delay);
            })
            .call()
    }
}
