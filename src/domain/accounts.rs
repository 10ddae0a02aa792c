//! Account management: registration, login, profile changes and history.

use rust_decimal::Decimal;
use std::sync::LazyLock;

use super::account::AccountId;
use super::error::LedgerError;
use super::password::{hash_password, verify_password};
use super::session::Session;
use super::trade::TradeRecord;
use crate::ports::ledger_port::LedgerPort;

/// Verified against when the username is unknown, so a miss costs the same
/// argon2 work as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("papertrade-dummy-password").ok());

/// Requested profile changes. Empty strings are treated like `None`.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub current_password: String,
    pub new_username: Option<String>,
    pub new_password: Option<String>,
    pub new_password_confirmation: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Create an account holding `starting_cash`.
pub fn register(
    ledger: &dyn LedgerPort,
    username: &str,
    password: &str,
    starting_cash: Decimal,
) -> Result<AccountId, LedgerError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(LedgerError::MissingField { field: "username" });
    }
    if password.is_empty() {
        return Err(LedgerError::MissingField { field: "password" });
    }

    let password_hash = hash_password(password)?;
    let id = ledger.create_account(username, &password_hash, starting_cash)?;
    log::info!("registered account {} ({})", id, username);
    Ok(id)
}

/// Check credentials and open a session.
///
/// Unknown usernames and wrong passwords are indistinguishable to the caller.
pub fn authenticate(
    ledger: &dyn LedgerPort,
    username: &str,
    password: &str,
) -> Result<Session, LedgerError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(LedgerError::MissingField { field: "username" });
    }
    if password.is_empty() {
        return Err(LedgerError::MissingField { field: "password" });
    }

    match ledger.find_account_by_username(username)? {
        Some(account) if verify_password(password, &account.password_hash) => {
            Ok(Session::new(account.id, account.username))
        }
        Some(_) => {
            log::warn!("failed login for {}", username);
            Err(LedgerError::InvalidCredentials)
        }
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            log::warn!("failed login for {}", username);
            Err(LedgerError::InvalidCredentials)
        }
    }
}

/// Change username and/or password after re-checking the current password.
///
/// Returns a session carrying the possibly new username. Cash is untouched.
pub fn update_profile(
    ledger: &dyn LedgerPort,
    session: &Session,
    update: &ProfileUpdate,
) -> Result<Session, LedgerError> {
    let account = ledger
        .find_account(session.account_id())?
        .ok_or(LedgerError::AccountNotFound {
            id: session.account_id().0,
        })?;

    if !verify_password(&update.current_password, &account.password_hash) {
        return Err(LedgerError::InvalidCredentials);
    }

    let new_username = non_empty(&update.new_username).map(str::trim);
    let new_hash = match non_empty(&update.new_password) {
        Some(new_password) => {
            if non_empty(&update.new_password_confirmation) != Some(new_password) {
                return Err(LedgerError::PasswordMismatch);
            }
            Some(hash_password(new_password)?)
        }
        None => None,
    };

    if new_username.is_none() && new_hash.is_none() {
        return Ok(session.clone());
    }

    ledger.update_credentials(account.id, new_username, new_hash.as_deref())?;
    log::info!("updated profile for account {}", account.id);

    Ok(Session::new(
        account.id,
        new_username.unwrap_or(account.username.as_str()),
    ))
}

/// Executed trades, newest first.
pub fn trade_history(
    ledger: &dyn LedgerPort,
    session: &Session,
) -> Result<Vec<TradeRecord>, LedgerError> {
    ledger.history(session.account_id())
}
