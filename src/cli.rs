//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_quote_adapter::CsvQuoteAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
#[cfg(feature = "http-quotes")]
use crate::adapters::http_quote_adapter::HttpQuoteAdapter;
use crate::adapters::retrying_quote_adapter::RetryingQuoteAdapter;
use crate::adapters::sqlite_adapter::SqliteLedger;
use crate::domain::accounts::{self, ProfileUpdate};
use crate::domain::config_validation::{
    quote_retries, quote_source, starting_cash, validate_config,
};
use crate::domain::error::LedgerError;
use crate::domain::money::format_usd;
use crate::domain::quote::lookup_quote;
use crate::domain::session::Session;
use crate::domain::settlement::SettlementEngine;
use crate::domain::trade::TradeOrder;
use crate::domain::valuation::value_account;
use crate::ports::config_port::ConfigPort;
use crate::ports::quote_port::QuotePort;

#[derive(Parser, Debug)]
#[command(name = "papertrade", about = "Simulated stock trading ledger")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct Credentials {
    #[arg(short, long)]
    pub username: String,
    #[arg(long, env = "PAPERTRADE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    Register {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        credentials: Credentials,
        /// Must match the password when given
        #[arg(long)]
        confirmation: Option<String>,
    },
    /// Look up the current price of a symbol
    Quote {
        #[arg(short, long)]
        config: PathBuf,
        symbol: String,
    },
    /// Buy shares at the current price
    Buy {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        credentials: Credentials,
        symbol: String,
        #[arg(allow_hyphen_values = true)]
        shares: i64,
    },
    /// Sell shares at the current price
    Sell {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        credentials: Credentials,
        symbol: String,
        #[arg(allow_hyphen_values = true)]
        shares: i64,
    },
    /// Show cash, open positions and net worth
    Portfolio {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        credentials: Credentials,
    },
    /// List executed trades, newest first
    History {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Change username and/or password
    Profile {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        credentials: Credentials,
        #[arg(long)]
        new_username: Option<String>,
        #[arg(long, env = "PAPERTRADE_NEW_PASSWORD", hide_env_values = true)]
        new_password: Option<String>,
        #[arg(long)]
        new_password_confirmation: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Register {
            config,
            credentials,
            confirmation,
        } => run_register(&config, &credentials, confirmation.as_deref()),
        Command::Quote { config, symbol } => run_quote(&config, &symbol),
        Command::Buy {
            config,
            credentials,
            symbol,
            shares,
        } => run_trade(&config, &credentials, TradeOrder::buy(symbol, shares)),
        Command::Sell {
            config,
            credentials,
            symbol,
            shares,
        } => run_trade(&config, &credentials, TradeOrder::sell(symbol, shares)),
        Command::Portfolio {
            config,
            credentials,
        } => run_portfolio(&config, &credentials),
        Command::History {
            config,
            credentials,
        } => run_history(&config, &credentials),
        Command::Profile {
            config,
            credentials,
            new_username,
            new_password,
            new_password_confirmation,
        } => run_profile(
            &config,
            &credentials,
            ProfileUpdate {
                current_password: credentials.password.clone(),
                new_username,
                new_password,
                new_password_confirmation,
            },
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

/// Load and validate the config file.
pub fn load_config(path: &Path) -> Result<FileConfigAdapter, LedgerError> {
    log::debug!("loading config from {}", path.display());
    let config = FileConfigAdapter::from_file(path)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn open_ledger(config: &dyn ConfigPort) -> Result<SqliteLedger, LedgerError> {
    SqliteLedger::from_config(config)
}

/// Build the configured quote source, wrapped for retries when `[quotes] retries`
/// is positive.
pub fn open_quotes(config: &dyn ConfigPort) -> Result<Box<dyn QuotePort>, LedgerError> {
    let inner: Box<dyn QuotePort> = match quote_source(config)?.as_str() {
        "http" => http_quotes(config)?,
        _ => Box::new(CsvQuoteAdapter::from_config(config)?),
    };

    let retries = quote_retries(config)?;
    if retries > 0 {
        Ok(Box::new(RetryingQuoteAdapter::new(inner, retries)))
    } else {
        Ok(inner)
    }
}

#[cfg(feature = "http-quotes")]
fn http_quotes(config: &dyn ConfigPort) -> Result<Box<dyn QuotePort>, LedgerError> {
    Ok(Box::new(HttpQuoteAdapter::from_config(config)?))
}

#[cfg(not(feature = "http-quotes"))]
fn http_quotes(_config: &dyn ConfigPort) -> Result<Box<dyn QuotePort>, LedgerError> {
    Err(LedgerError::ConfigInvalid {
        section: "quotes".into(),
        key: "source".into(),
        reason: "built without the http-quotes feature".into(),
    })
}

fn login(ledger: &SqliteLedger, credentials: &Credentials) -> Result<Session, LedgerError> {
    accounts::authenticate(ledger, &credentials.username, &credentials.password)
}

fn run_register(
    config_path: &Path,
    credentials: &Credentials,
    confirmation: Option<&str>,
) -> Result<(), LedgerError> {
    if confirmation.is_some_and(|c| c != credentials.password) {
        return Err(LedgerError::PasswordMismatch);
    }

    let config = load_config(config_path)?;
    let ledger = open_ledger(&config)?;
    let id = accounts::register(
        &ledger,
        &credentials.username,
        &credentials.password,
        starting_cash(&config)?,
    )?;

    eprintln!("Registered!");
    println!("{} (account {})", credentials.username.trim(), id);
    Ok(())
}

fn run_quote(config_path: &Path, symbol: &str) -> Result<(), LedgerError> {
    let config = load_config(config_path)?;
    let quotes = open_quotes(&config)?;
    let quote = lookup_quote(quotes.as_ref(), symbol)?;
    println!("{}", quote.describe());
    Ok(())
}

fn run_trade(
    config_path: &Path,
    credentials: &Credentials,
    order: TradeOrder,
) -> Result<(), LedgerError> {
    let config = load_config(config_path)?;
    let ledger = open_ledger(&config)?;
    let quotes = open_quotes(&config)?;
    let session = login(&ledger, credentials)?;

    let engine = SettlementEngine::new(&ledger, quotes.as_ref());
    let receipt = engine.execute_trade(&session, &order)?;

    eprintln!("{}", receipt.message());
    let record = &receipt.record;
    println!(
        "{} {} {} ({}) at {} = {}",
        record.side,
        record.share_count,
        record.symbol,
        receipt.name,
        format_usd(record.stock_price),
        format_usd(record.total())
    );
    Ok(())
}

fn run_portfolio(config_path: &Path, credentials: &Credentials) -> Result<(), LedgerError> {
    let config = load_config(config_path)?;
    let ledger = open_ledger(&config)?;
    let quotes = open_quotes(&config)?;
    let session = login(&ledger, credentials)?;

    let valuation = value_account(&ledger, quotes.as_ref(), &session)?;

    println!(
        "{:<8} {:<28} {:>8} {:>14} {:>16}",
        "SYMBOL", "NAME", "SHARES", "PRICE", "TOTAL"
    );
    for position in &valuation.positions {
        let na = || "n/a".to_string();
        println!(
            "{:<8} {:<28} {:>8} {:>14} {:>16}",
            position.symbol,
            position.name.clone().unwrap_or_else(na),
            position.share_count,
            position.price.map(format_usd).unwrap_or_else(na),
            position.value.map(format_usd).unwrap_or_else(na),
        );
    }
    println!("{:<8} {:>69}", "CASH", format_usd(valuation.cash));
    println!("{:<8} {:>69}", "TOTAL", format_usd(valuation.net_worth));

    if !valuation.is_complete() {
        let missing: Vec<&str> = valuation.unpriced().map(|s| s.as_str()).collect();
        eprintln!(
            "warning: no current price for {}; left out of TOTAL",
            missing.join(", ")
        );
    }
    Ok(())
}

fn run_history(config_path: &Path, credentials: &Credentials) -> Result<(), LedgerError> {
    let config = load_config(config_path)?;
    let ledger = open_ledger(&config)?;
    let session = login(&ledger, credentials)?;

    let history = accounts::trade_history(&ledger, &session)?;
    if history.is_empty() {
        eprintln!("No trades yet");
        return Ok(());
    }

    println!(
        "{:<5} {:<8} {:>8} {:>14} {:<}",
        "SIDE", "SYMBOL", "SHARES", "PRICE", "TRANSACTED"
    );
    for record in &history {
        println!(
            "{:<5} {:<8} {:>8} {:>14} {}",
            record.side,
            record.symbol,
            record.share_count,
            format_usd(record.stock_price),
            record.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    Ok(())
}

fn run_profile(
    config_path: &Path,
    credentials: &Credentials,
    update: ProfileUpdate,
) -> Result<(), LedgerError> {
    let config = load_config(config_path)?;
    let ledger = open_ledger(&config)?;
    let session = login(&ledger, credentials)?;

    let session = accounts::update_profile(&ledger, &session, &update)?;
    eprintln!("Profile updated");
    println!("{}", session.username());
    Ok(())
}
