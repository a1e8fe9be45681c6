use std::{cell::RefCell, collections::HashMap};

use uuid::Uuid;

use super::{AccountId, AccountRecord, Store, TransactionId, TransactionRecord};
use crate::{
    errors::{LedgerError, Result},
    ledger::{Account, Transaction},
};

/// Store calls that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    CreateAccount,
    RemoveAccount,
    RenameAccount,
    MakeTransaction,
    RemoveTransaction,
    UpdateTransaction,
    GetTransactions,
    SetCurrency,
}

#[derive(Default)]
struct MemoryState {
    accounts: Vec<AccountRecord>,
    transactions: HashMap<AccountId, Vec<TransactionRecord>>,
    currency: usize,
    fetches: HashMap<AccountId, usize>,
    failures: Vec<StoreOperation>,
}

/// Keeps every record in process memory; ids are random v4 UUIDs.
#[derive(Default)]
pub struct MemoryStore {
    state: RefCell<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of `operation` return a storage error.
    pub fn fail_next(&self, operation: StoreOperation) {
        self.state.borrow_mut().failures.push(operation);
    }

    /// Adds a persisted transaction without going through an account, adjusting
    /// the stored balance as a real backend would.
    pub fn seed_transaction(&self, account: AccountId, record: TransactionRecord) {
        let mut state = self.state.borrow_mut();
        if let Some(stored) = state.accounts.iter_mut().find(|a| a.id == account) {
            stored.balance += record.amount;
        }
        state.transactions.entry(account).or_default().push(record);
    }

    /// How many times the transactions of `account` were fetched.
    pub fn fetch_count(&self, account: AccountId) -> usize {
        self.state
            .borrow()
            .fetches
            .get(&account)
            .copied()
            .unwrap_or(0)
    }

    pub fn transaction_count(&self) -> usize {
        self.state.borrow().transactions.values().map(Vec::len).sum()
    }

    fn check(&self, operation: StoreOperation) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(pos) = state.failures.iter().position(|op| *op == operation) {
            state.failures.remove(pos);
            return Err(LedgerError::Storage(format!("{:?} failed", operation)));
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    fn create_account(&self, name: &str) -> Result<AccountRecord> {
        self.check(StoreOperation::CreateAccount)?;
        let mut state = self.state.borrow_mut();
        let record = AccountRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            currency: state.currency,
            balance: 0.0,
        };
        state.accounts.push(record.clone());
        Ok(record)
    }

    fn remove_account(&self, account: &Account) -> Result<()> {
        self.check(StoreOperation::RemoveAccount)?;
        let mut state = self.state.borrow_mut();
        let before = state.accounts.len();
        state.accounts.retain(|record| record.id != account.id());
        if state.accounts.len() == before {
            return Err(LedgerError::Storage(format!(
                "account {} is not stored",
                account.id()
            )));
        }
        state.transactions.remove(&account.id());
        Ok(())
    }

    fn get_accounts(&self) -> Result<Vec<AccountRecord>> {
        Ok(self.state.borrow().accounts.clone())
    }

    fn rename_account(&self, account: &Account, new_name: &str) -> Result<()> {
        self.check(StoreOperation::RenameAccount)?;
        let mut state = self.state.borrow_mut();
        let stored = state
            .accounts
            .iter_mut()
            .find(|record| record.id == account.id())
            .ok_or_else(|| {
                LedgerError::Storage(format!("account {} is not stored", account.id()))
            })?;
        stored.name = new_name.to_string();
        Ok(())
    }

    fn make_transaction(
        &self,
        account: &Account,
        transaction: &Transaction,
    ) -> Result<TransactionId> {
        self.check(StoreOperation::MakeTransaction)?;
        let record = TransactionRecord {
            id: Uuid::new_v4(),
            amount: transaction.amount(),
            description: transaction.description(),
            date: transaction.date(),
        };
        let id = record.id;
        self.seed_transaction(account.id(), record);
        Ok(id)
    }

    fn remove_transaction(&self, transaction: &Transaction) -> Result<()> {
        self.check(StoreOperation::RemoveTransaction)?;
        let id = transaction
            .id()
            .ok_or_else(|| LedgerError::Storage("transaction was never stored".into()))?;
        let mut state = self.state.borrow_mut();
        let MemoryState {
            accounts,
            transactions,
            ..
        } = &mut *state;
        for (account_id, records) in transactions.iter_mut() {
            if let Some(pos) = records.iter().position(|record| record.id == id) {
                let removed = records.remove(pos);
                if let Some(stored) = accounts.iter_mut().find(|a| a.id == *account_id) {
                    stored.balance -= removed.amount;
                }
                return Ok(());
            }
        }
        Err(LedgerError::Storage(format!("transaction {} is not stored", id)))
    }

    fn update_transaction(&self, record: &TransactionRecord) -> Result<()> {
        self.check(StoreOperation::UpdateTransaction)?;
        let mut state = self.state.borrow_mut();
        let MemoryState {
            accounts,
            transactions,
            ..
        } = &mut *state;
        for (account_id, records) in transactions.iter_mut() {
            if let Some(stored) = records.iter_mut().find(|stored| stored.id == record.id) {
                let delta = record.amount - stored.amount;
                *stored = record.clone();
                if let Some(account) = accounts.iter_mut().find(|a| a.id == *account_id) {
                    account.balance += delta;
                }
                return Ok(());
            }
        }
        Err(LedgerError::Storage(format!(
            "transaction {} is not stored",
            record.id
        )))
    }

    fn get_transactions_from(&self, account: &Account) -> Result<Vec<TransactionRecord>> {
        self.check(StoreOperation::GetTransactions)?;
        let mut state = self.state.borrow_mut();
        *state.fetches.entry(account.id()).or_default() += 1;
        Ok(state
            .transactions
            .get(&account.id())
            .cloned()
            .unwrap_or_default())
    }

    fn currency(&self) -> Result<usize> {
        Ok(self.state.borrow().currency)
    }

    fn set_currency(&self, index: usize) -> Result<()> {
        self.check(StoreOperation::SetCurrency)?;
        let mut state = self.state.borrow_mut();
        state.currency = index;
        for record in state.accounts.iter_mut() {
            record.currency = index;
        }
        Ok(())
    }
}
