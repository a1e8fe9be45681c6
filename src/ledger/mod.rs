//! Ledger object model: accounts, their transactions, and the bank facade.

pub mod account;
pub mod account_list;
pub mod bank;
pub mod context;
pub mod transaction;
pub mod transaction_list;

pub use account::{Account, AccountRef};
pub use account_list::AccountList;
pub use bank::BankModel;
pub use context::LedgerContext;
pub use transaction::{Transaction, TransactionBuilder, TransactionRef};
pub use transaction_list::TransactionList;
