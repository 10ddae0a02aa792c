//! SQLite ledger adapter.

use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::account::{Account, AccountId};
use crate::domain::config_validation::{busy_timeout, pool_size};
use crate::domain::error::LedgerError;
use crate::domain::money::to_cents;
use crate::domain::position::Position;
use crate::domain::settlement;
use crate::domain::symbol::Symbol;
use crate::domain::trade::{PricedOrder, Side, TradeRecord};
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        hash TEXT NOT NULL,
        cash TEXT NOT NULL DEFAULT '10000.00' CHECK (CAST(cash AS REAL) >= 0)
    );
    CREATE TABLE IF NOT EXISTS portfolio (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id),
        symbol TEXT NOT NULL,
        share_count INTEGER NOT NULL DEFAULT 0 CHECK (share_count >= 0),
        UNIQUE (user_id, symbol)
    );
    CREATE TABLE IF NOT EXISTS history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id),
        symbol TEXT NOT NULL,
        stock_price TEXT NOT NULL,
        share_count INTEGER NOT NULL CHECK (share_count > 0),
        trade_type TEXT NOT NULL CHECK (trade_type IN ('buy', 'sell')),
        timestamp TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_history_user_id ON history(user_id);
    CREATE TRIGGER IF NOT EXISTS history_no_update BEFORE UPDATE ON history
    BEGIN
        SELECT RAISE(ABORT, 'history is append-only');
    END;
    CREATE TRIGGER IF NOT EXISTS history_no_delete BEFORE DELETE ON history
    BEGIN
        SELECT RAISE(ABORT, 'history is append-only');
    END;";

pub struct SqliteLedger {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> LedgerError {
    LedgerError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> LedgerError {
    LedgerError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn conversion_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

fn decimal_column(row: &rusqlite::Row<'_>, column: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(column)?;
    Decimal::from_str(&text).map_err(|e| conversion_error(column, e))
}

fn symbol_column(row: &rusqlite::Row<'_>, column: usize) -> rusqlite::Result<Symbol> {
    let text: String = row.get(column)?;
    Symbol::parse(&text).map_err(|e| conversion_error(column, e))
}

fn account_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: AccountId(row.get(0)?),
        username: row.get(1)?,
        password_hash: row.get(2)?,
        cash: decimal_column(row, 3)?,
    })
}

fn trade_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TradeRecord> {
    let side: String = row.get(5)?;
    let timestamp: String = row.get(6)?;
    Ok(TradeRecord {
        id: row.get(0)?,
        account_id: AccountId(row.get(1)?),
        symbol: symbol_column(row, 2)?,
        stock_price: decimal_column(row, 3)?,
        share_count: row.get(4)?,
        side: side.parse::<Side>().map_err(|e| conversion_error(5, e))?,
        timestamp: DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| conversion_error(6, e))?
            .with_timezone(&Utc),
    })
}

impl SqliteLedger {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, LedgerError> {
        let db_path =
            config
                .get_string("database", "path")
                .ok_or_else(|| LedgerError::ConfigMissing {
                    section: "database".into(),
                    key: "path".into(),
                })?;

        Self::open(&db_path, pool_size(config)?, busy_timeout(config)?)
    }

    /// Open (creating if needed) a database file and its schema.
    pub fn open(path: &str, pool_size: u32, busy_timeout: Duration) -> Result<Self, LedgerError> {
        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.pragma_update(None, "foreign_keys", true)
        });
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;

        let ledger = Self { pool };
        ledger.initialize_schema()?;
        log::debug!("opened ledger database {}", path);
        Ok(ledger)
    }

    /// A private in-memory database. One pooled connection, so every caller
    /// sees the same data.
    pub fn in_memory() -> Result<Self, LedgerError> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| conn.pragma_update(None, "foreign_keys", true));
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        let ledger = Self { pool };
        ledger.initialize_schema()?;
        Ok(ledger)
    }

    pub fn initialize_schema(&self) -> Result<(), LedgerError> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA).map_err(query_error)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, LedgerError> {
        self.pool.get().map_err(pool_error)
    }
}

impl LedgerPort for SqliteLedger {
    fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        starting_cash: Decimal,
    ) -> Result<AccountId, LedgerError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (username, hash, cash) VALUES (?1, ?2, ?3)",
            params![username, password_hash, to_cents(starting_cash).to_string()],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                LedgerError::UsernameTaken {
                    username: username.to_string(),
                }
            } else {
                query_error(e)
            }
        })?;

        Ok(AccountId(conn.last_insert_rowid()))
    }

    fn find_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, username, hash, cash FROM users WHERE id = ?1",
            params![id.0],
            account_from_row,
        )
        .optional()
        .map_err(query_error)
    }

    fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, LedgerError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, username, hash, cash FROM users WHERE username = ?1",
            params![username],
            account_from_row,
        )
        .optional()
        .map_err(query_error)
    }

    fn update_credentials(
        &self,
        id: AccountId,
        username: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<(), LedgerError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE users
                 SET username = COALESCE(?1, username), hash = COALESCE(?2, hash)
                 WHERE id = ?3",
                params![username, password_hash, id.0],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    LedgerError::UsernameTaken {
                        username: username.unwrap_or_default().to_string(),
                    }
                } else {
                    query_error(e)
                }
            })?;

        if changed == 0 {
            return Err(LedgerError::AccountNotFound { id: id.0 });
        }
        Ok(())
    }

    fn open_positions(&self, id: AccountId) -> Result<Vec<Position>, LedgerError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT symbol, share_count FROM portfolio
                 WHERE user_id = ?1 AND share_count > 0
                 ORDER BY symbol ASC",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![id.0], |row| {
                Ok(Position {
                    symbol: symbol_column(row, 0)?,
                    share_count: row.get(1)?,
                })
            })
            .map_err(query_error)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_error)
    }

    fn history(&self, id: AccountId) -> Result<Vec<TradeRecord>, LedgerError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, symbol, stock_price, share_count, trade_type, timestamp
                 FROM history
                 WHERE user_id = ?1
                 ORDER BY id DESC",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![id.0], trade_from_row)
            .map_err(query_error)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_error)
    }

    fn settle(&self, id: AccountId, order: &PricedOrder) -> Result<TradeRecord, LedgerError> {
        let mut conn = self.conn()?;

        // IMMEDIATE takes the write lock before the reads below, so no other
        // trade can change this balance or holding until commit.
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(query_error)?;

        let cash = tx
            .query_row(
                "SELECT cash FROM users WHERE id = ?1",
                params![id.0],
                |row| decimal_column(row, 0),
            )
            .optional()
            .map_err(query_error)?
            .ok_or(LedgerError::AccountNotFound { id: id.0 })?;

        let held: i64 = tx
            .query_row(
                "SELECT share_count FROM portfolio WHERE user_id = ?1 AND symbol = ?2",
                params![id.0, order.symbol.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_error)?
            .unwrap_or(0);

        let plan = settlement::plan(cash, held, order)?;
        let stock_price = to_cents(order.price);
        let timestamp = Utc::now();

        tx.execute(
            "UPDATE users SET cash = ?1 WHERE id = ?2",
            params![to_cents(plan.cash_after).to_string(), id.0],
        )
        .map_err(query_error)?;

        tx.execute(
            "INSERT INTO portfolio (user_id, symbol, share_count) VALUES (?1, ?2, ?3)
             ON CONFLICT (user_id, symbol) DO UPDATE SET share_count = excluded.share_count",
            params![id.0, order.symbol.as_str(), plan.shares_after],
        )
        .map_err(query_error)?;

        tx.execute(
            "INSERT INTO history (user_id, symbol, stock_price, share_count, trade_type, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id.0,
                order.symbol.as_str(),
                stock_price.to_string(),
                order.quantity,
                order.side.as_str(),
                timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
            ],
        )
        .map_err(query_error)?;
        let record_id = tx.last_insert_rowid();

        tx.commit().map_err(query_error)?;

        Ok(TradeRecord {
            id: record_id,
            account_id: id,
            symbol: order.symbol.clone(),
            stock_price,
            share_count: order.quantity,
            side: order.side,
            timestamp,
        })
    }
}
