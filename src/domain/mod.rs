//! Core domain types and logic.

pub mod account;
pub mod accounts;
pub mod config_validation;
pub mod error;
pub mod money;
pub mod password;
pub mod position;
pub mod quote;
pub mod session;
pub mod settlement;
pub mod symbol;
pub mod trade;
pub mod valuation;
