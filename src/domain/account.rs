//! Accounts: identity, credentials and cash.

use rust_decimal::Decimal;
use std::fmt;

/// Primary key of an account row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    /// PHC-format argon2 hash. Never the plaintext password.
    pub password_hash: String,
    pub cash: Decimal,
}

// Hand-written so the hash stays out of logs.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("cash", &self.cash)
            .finish_non_exhaustive()
    }
}
