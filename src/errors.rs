use thiserror::Error;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Account not found: {0}")]
    InvalidAccount(String),
    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid amount format: {0}")]
    InvalidAmountFormat(String),
    #[error("Unknown currency index: {0}")]
    InvalidCurrency(usize),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
