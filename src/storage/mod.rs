pub mod memory;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::Result,
    ledger::{Account, Transaction},
};

pub use memory::MemoryStore;

pub type AccountId = Uuid;
pub type TransactionId = Uuid;

/// Persisted shape of an account, as handed back by a [`Store`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountRecord {
    pub id: AccountId,
    pub name: String,
    pub currency: usize,
    pub balance: f64,
}

/// Persisted shape of a transaction, as handed back by a [`Store`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub amount: f64,
    pub description: String,
    pub date: NaiveDate,
}

/// Persistence collaborator consulted by the ledger objects.
///
/// Calls are synchronous; implementations use interior mutability where they keep state.
pub trait Store {
    /// Persists a new, empty account and returns it with its assigned identity.
    fn create_account(&self, name: &str) -> Result<AccountRecord>;
    fn remove_account(&self, account: &Account) -> Result<()>;
    fn get_accounts(&self) -> Result<Vec<AccountRecord>>;
    fn rename_account(&self, account: &Account, new_name: &str) -> Result<()>;
    /// Persists `transaction` for `account` and returns the identity it was assigned.
    fn make_transaction(&self, account: &Account, transaction: &Transaction)
        -> Result<TransactionId>;
    fn remove_transaction(&self, transaction: &Transaction) -> Result<()>;
    /// Replaces the stored fields of an already persisted transaction.
    fn update_transaction(&self, record: &TransactionRecord) -> Result<()>;
    fn get_transactions_from(&self, account: &Account) -> Result<Vec<TransactionRecord>>;
    fn currency(&self) -> Result<usize>;
    fn set_currency(&self, index: usize) -> Result<()>;
}
