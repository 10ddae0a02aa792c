//! Configuration validation.
//!
//! Validates all config fields before any store or quote source is opened.

use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::error::LedgerError;
use crate::domain::money::{to_cents, DEFAULT_STARTING_CASH};
use crate::ports::config_port::ConfigPort;

pub const QUOTE_SOURCES: &[&str] = &["csv", "http"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    validate_database(config)?;
    starting_cash(config)?;
    validate_quotes(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> LedgerError {
    LedgerError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn missing(section: &str, key: &str) -> LedgerError {
    LedgerError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn require_string(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, LedgerError> {
    config
        .get_string(section, key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| missing(section, key))
}

/// Read an integer key that must fit in a `u32` and be at least `min`.
fn bounded_u32(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: u32,
    min: u32,
) -> Result<u32, LedgerError> {
    let raw = config.get_int(section, key, i64::from(default));
    match u32::try_from(raw) {
        Ok(value) if value >= min => Ok(value),
        _ => Err(invalid(
            section,
            key,
            format!("{key} must be between {min} and {}", u32::MAX),
        )),
    }
}

/// `[database] pool_size`. Defaults to 4.
pub fn pool_size(config: &dyn ConfigPort) -> Result<u32, LedgerError> {
    bounded_u32(config, "database", "pool_size", 4, 1)
}

/// `[database] busy_timeout_ms`. Defaults to five seconds.
pub fn busy_timeout(config: &dyn ConfigPort) -> Result<Duration, LedgerError> {
    let ms = bounded_u32(config, "database", "busy_timeout_ms", 5000, 0)?;
    Ok(Duration::from_millis(ms.into()))
}

/// `[quotes] timeout_secs` for the HTTP source. Defaults to ten seconds.
pub fn quote_timeout(config: &dyn ConfigPort) -> Result<Duration, LedgerError> {
    let secs = bounded_u32(config, "quotes", "timeout_secs", 10, 1)?;
    Ok(Duration::from_secs(secs.into()))
}

/// `[quotes] retries`. Defaults to 0, meaning a single attempt.
pub fn quote_retries(config: &dyn ConfigPort) -> Result<u32, LedgerError> {
    bounded_u32(config, "quotes", "retries", 0, 0)
}

pub fn validate_database(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    require_string(config, "database", "path")?;
    pool_size(config)?;
    busy_timeout(config)?;
    Ok(())
}

/// `[accounts] starting_cash`, in cents. Defaults to 10000.00.
pub fn starting_cash(config: &dyn ConfigPort) -> Result<Decimal, LedgerError> {
    let Some(raw) = config.get_string("accounts", "starting_cash") else {
        return Ok(DEFAULT_STARTING_CASH);
    };
    let value = Decimal::from_str(raw.trim())
        .map_err(|_| invalid("accounts", "starting_cash", "not a decimal amount"))?;
    if value.is_sign_negative() {
        return Err(invalid(
            "accounts",
            "starting_cash",
            "starting_cash must be non-negative",
        ));
    }
    Ok(to_cents(value))
}

/// `[quotes] source`, lowercased. Defaults to `csv`.
pub fn quote_source(config: &dyn ConfigPort) -> Result<String, LedgerError> {
    let source = config
        .get_string("quotes", "source")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| "csv".to_string());
    if !QUOTE_SOURCES.contains(&source.as_str()) {
        return Err(invalid(
            "quotes",
            "source",
            format!("expected one of {}", QUOTE_SOURCES.join(", ")),
        ));
    }
    Ok(source)
}

pub fn validate_quotes(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    match quote_source(config)?.as_str() {
        "csv" => {
            require_string(config, "quotes", "csv_path")?;
        }
        _ => {
            let base_url = require_string(config, "quotes", "base_url")?;
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(invalid(
                    "quotes",
                    "base_url",
                    "base_url must start with http:// or https://",
                ));
            }
            quote_timeout(config)?;
        }
    }

    quote_retries(config)?;
    Ok(())
}
