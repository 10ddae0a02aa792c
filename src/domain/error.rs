//! Domain error types.

use rust_decimal::Decimal;

/// Top-level error type for papertrade.
///
/// Trade, credential and account variants are expected outcomes of a request and
/// are reported back to the user. Storage and configuration variants abort the
/// request.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("share count must be a positive integer, got {quantity}")]
    InvalidQuantity { quantity: i64 },

    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("insufficient funds: trade costs {required}, available cash is {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("insufficient shares: you have {held} shares of {symbol}, tried to sell {requested}")]
    InsufficientShares {
        symbol: String,
        held: i64,
        requested: i64,
    },

    #[error("username already exists: {username}")]
    UsernameTaken { username: String },

    #[error("invalid username and/or password")]
    InvalidCredentials,

    #[error("passwords don't match")]
    PasswordMismatch,

    #[error("account {id} not found")]
    AccountNotFound { id: i64 },

    #[error("must provide {field}")]
    MissingField { field: &'static str },

    #[error("password hashing failed: {reason}")]
    PasswordHash { reason: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// True for rejections the user can act on, false for faults.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidQuantity { .. }
                | LedgerError::UnknownSymbol { .. }
                | LedgerError::InsufficientFunds { .. }
                | LedgerError::InsufficientShares { .. }
                | LedgerError::UsernameTaken { .. }
                | LedgerError::InvalidCredentials
                | LedgerError::PasswordMismatch
                | LedgerError::AccountNotFound { .. }
                | LedgerError::MissingField { .. }
        )
    }

    pub(crate) fn unknown_symbol(symbol: impl Into<String>) -> Self {
        LedgerError::UnknownSymbol {
            symbol: symbol.into(),
        }
    }
}

impl From<&LedgerError> for std::process::ExitCode {
    fn from(err: &LedgerError) -> Self {
        let code: u8 = match err {
            LedgerError::Io(_) => 1,
            LedgerError::ConfigParse { .. }
            | LedgerError::ConfigMissing { .. }
            | LedgerError::ConfigInvalid { .. } => 2,
            LedgerError::Database { .. }
            | LedgerError::DatabaseQuery { .. }
            | LedgerError::PasswordHash { .. } => 3,
            LedgerError::UsernameTaken { .. }
            | LedgerError::InvalidCredentials
            | LedgerError::PasswordMismatch
            | LedgerError::AccountNotFound { .. }
            | LedgerError::MissingField { .. } => 4,
            LedgerError::InvalidQuantity { .. }
            | LedgerError::UnknownSymbol { .. }
            | LedgerError::InsufficientFunds { .. }
            | LedgerError::InsufficientShares { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
