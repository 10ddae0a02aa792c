//! CLI integration tests with real INI, CSV and SQLite files on disk.

use clap::Parser;
use papertrade::adapters::file_config_adapter::FileConfigAdapter;
use papertrade::adapters::sqlite_adapter::SqliteLedger;
use papertrade::cli::{self, Cli};
use papertrade::domain::error::LedgerError;
use papertrade::domain::symbol::Symbol;
use papertrade::ports::ledger_port::LedgerPort;
use papertrade::ports::quote_port::QuotePort;
use rust_decimal_macros::dec;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const QUOTES_CSV: &str = "symbol,name,price\n\
AAPL,Apple Inc.,190.00\n\
NFLX,\"Netflix, Inc.\",600.00\n";

struct Workspace {
    dir: tempfile::TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        Self::with_extra("")
    }

    fn with_extra(extra: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("ledger.db");
        let quotes = dir.path().join("quotes.csv");
        fs::write(&quotes, QUOTES_CSV).unwrap();

        let config = dir.path().join("papertrade.ini");
        fs::write(
            &config,
            format!(
                "[database]\npath = {}\n\n[accounts]\nstarting_cash = 10000.00\n\n\
                 [quotes]\nsource = csv\ncsv_path = {}\n{}",
                db.display(),
                quotes.display(),
                extra
            ),
        )
        .unwrap();

        Self { dir, config }
    }

    fn run(&self, args: &[&str]) -> ExitCode {
        let (command, rest) = args.split_first().unwrap();
        let mut argv = vec![
            "papertrade".to_string(),
            command.to_string(),
            "-c".to_string(),
            self.config.display().to_string(),
        ];
        argv.extend(rest.iter().map(|s| s.to_string()));
        cli::run(Cli::try_parse_from(argv).unwrap())
    }

    fn as_user(&self, command: &str, username: &str, password: &str, rest: &[&str]) -> ExitCode {
        let mut args = vec![command, "-u", username, "--password", password];
        args.extend_from_slice(rest);
        self.run(&args)
    }

    fn ledger(&self) -> SqliteLedger {
        let config = FileConfigAdapter::from_file(&self.config).unwrap();
        SqliteLedger::from_config(&config).unwrap()
    }

    fn db_path(&self) -> PathBuf {
        self.dir.path().join("ledger.db")
    }
}

fn code(c: u8) -> String {
    format!("{:?}", ExitCode::from(c))
}

fn success() -> String {
    format!("{:?}", ExitCode::SUCCESS)
}

fn shown(c: ExitCode) -> String {
    format!("{:?}", c)
}

#[test]
fn register_trade_and_inspect() {
    let ws = Workspace::new();

    assert_eq!(
        shown(ws.as_user("register", "alice", "hunter22", &["--confirmation", "hunter22"])),
        success()
    );
    assert_eq!(shown(ws.as_user("buy", "alice", "hunter22", &["aapl", "10"])), success());
    assert_eq!(shown(ws.as_user("sell", "alice", "hunter22", &["AAPL", "4"])), success());
    assert_eq!(shown(ws.as_user("portfolio", "alice", "hunter22", &[])), success());
    assert_eq!(shown(ws.as_user("history", "alice", "hunter22", &[])), success());

    let ledger = ws.ledger();
    let account = ledger.find_account_by_username("alice").unwrap().unwrap();
    assert_eq!(account.cash, dec!(8860.00));
    let positions = ledger.open_positions(account.id).unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].symbol, Symbol::parse("AAPL").unwrap());
    assert_eq!(positions[0].share_count, 6);
    assert_eq!(ledger.history(account.id).unwrap().len(), 2);
    assert!(ws.db_path().exists());
}

#[test]
fn rejections_map_to_exit_codes() {
    let ws = Workspace::new();
    assert_eq!(shown(ws.as_user("register", "bob", "pw", &[])), success());

    // account class
    assert_eq!(shown(ws.as_user("register", "bob", "pw", &[])), code(4));
    assert_eq!(shown(ws.as_user("buy", "bob", "wrong", &["AAPL", "1"])), code(4));
    assert_eq!(
        shown(ws.as_user("register", "carol", "pw", &["--confirmation", "wp"])),
        code(4)
    );

    // trade class
    assert_eq!(shown(ws.as_user("buy", "bob", "pw", &["AAPL", "1000"])), code(5));
    assert_eq!(shown(ws.as_user("buy", "bob", "pw", &["ZZZZ", "1"])), code(5));
    assert_eq!(shown(ws.as_user("buy", "bob", "pw", &["AAPL", "0"])), code(5));
    assert_eq!(shown(ws.as_user("sell", "bob", "pw", &["NFLX", "1"])), code(5));
    assert_eq!(shown(ws.run(&["quote", "ZZZZ"])), code(5));

    let ledger = ws.ledger();
    let account = ledger.find_account_by_username("bob").unwrap().unwrap();
    assert_eq!(account.cash, dec!(10000.00));
    assert!(ledger.history(account.id).unwrap().is_empty());
    assert!(ledger.find_account_by_username("carol").unwrap().is_none());
}

#[test]
fn quote_needs_no_account() {
    let ws = Workspace::new();
    assert_eq!(shown(ws.run(&["quote", "nflx"])), success());
}

#[test]
fn profile_rename() {
    let ws = Workspace::new();
    assert_eq!(shown(ws.as_user("register", "dave", "pw", &[])), success());
    assert_eq!(
        shown(ws.as_user("profile", "dave", "pw", &["--new-username", "david"])),
        success()
    );
    assert_eq!(shown(ws.as_user("portfolio", "david", "pw", &[])), success());
    assert_eq!(shown(ws.as_user("portfolio", "dave", "pw", &[])), code(4));
}

#[test]
fn starting_cash_comes_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("papertrade.ini");
    let quotes = dir.path().join("quotes.csv");
    fs::write(&quotes, QUOTES_CSV).unwrap();
    fs::write(
        &config,
        format!(
            "[database]\npath = {}\n[accounts]\nstarting_cash = 250.5\n[quotes]\ncsv_path = {}\n",
            dir.path().join("ledger.db").display(),
            quotes.display()
        ),
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "papertrade",
        "register",
        "-c",
        config.to_str().unwrap(),
        "-u",
        "erin",
        "--password",
        "pw",
    ])
    .unwrap();
    assert_eq!(shown(cli::run(cli)), success());

    let adapter = FileConfigAdapter::from_file(&config).unwrap();
    let ledger = SqliteLedger::from_config(&adapter).unwrap();
    let account = ledger.find_account_by_username("erin").unwrap().unwrap();
    assert_eq!(account.cash, dec!(250.50));
}

#[test]
fn invalid_config_is_exit_code_two() {
    let ws = Workspace::with_extra("retries = -1\n");
    assert_eq!(shown(ws.run(&["quote", "AAPL"])), code(2));

    let missing = Path::new("/nonexistent/papertrade.ini");
    assert!(matches!(
        cli::load_config(missing),
        Err(LedgerError::ConfigParse { .. })
    ));
}

#[test]
fn open_quotes_wraps_csv_source() {
    let ws = Workspace::with_extra("retries = 2\n");
    let config = cli::load_config(&ws.config).unwrap();
    let quotes = cli::open_quotes(&config).unwrap();
    let quote = quotes.lookup(&Symbol::parse("AAPL").unwrap()).unwrap();
    assert_eq!(quote.name, "Apple Inc.");
    assert_eq!(quote.price, dec!(190.00));
}
