//! Concrete adapter implementations for ports.

pub mod csv_quote_adapter;
pub mod file_config_adapter;
#[cfg(feature = "http-quotes")]
pub mod http_quote_adapter;
pub mod retrying_quote_adapter;
pub mod sqlite_adapter;
