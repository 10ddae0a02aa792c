//! Ledger storage port trait: accounts, positions and trade history.

use rust_decimal::Decimal;

use crate::domain::account::{Account, AccountId};
use crate::domain::error::LedgerError;
use crate::domain::position::Position;
use crate::domain::trade::{PricedOrder, TradeRecord};

/// Port for the account, portfolio and history stores.
///
/// All three live behind one trait so that [`LedgerPort::settle`] can apply a
/// trade to them inside a single transaction.
pub trait LedgerPort {
    /// Insert a new account. Fails with `UsernameTaken` on a duplicate username.
    fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        starting_cash: Decimal,
    ) -> Result<AccountId, LedgerError>;

    fn find_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError>;

    fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, LedgerError>;

    /// Change username and/or password hash. `None` leaves a field unchanged.
    /// Cash is never touched here.
    fn update_credentials(
        &self,
        id: AccountId,
        username: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<(), LedgerError>;

    /// Positions with a positive share count, ordered by symbol.
    fn open_positions(&self, id: AccountId) -> Result<Vec<Position>, LedgerError>;

    /// Every trade of the account, newest first.
    fn history(&self, id: AccountId) -> Result<Vec<TradeRecord>, LedgerError>;

    /// Apply a priced order atomically.
    ///
    /// Implementations must read the account's cash and current holding, run
    /// [`crate::domain::settlement::plan`] on them, and write the new balance, the
    /// new share count and one history row, all under one write lock on the
    /// account. On any error nothing is written. The history timestamp is
    /// assigned by the store.
    fn settle(&self, id: AccountId, order: &PricedOrder) -> Result<TradeRecord, LedgerError>;
}
