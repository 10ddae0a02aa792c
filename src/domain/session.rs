//! Authenticated session capability.

use super::account::AccountId;

/// Proof that the caller authenticated as an account.
///
/// Only [`crate::domain::accounts`] can mint one, so every account-scoped
/// operation that takes `&Session` is gated on a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    account_id: AccountId,
    username: String,
}

impl Session {
    pub(crate) fn new(account_id: AccountId, username: impl Into<String>) -> Self {
        Self {
            account_id,
            username: username.into(),
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}
