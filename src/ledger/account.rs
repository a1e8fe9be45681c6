use std::{
    cell::{Cell, RefCell},
    cmp::Ordering,
    fmt,
    rc::{Rc, Weak},
};

use tracing::{debug, warn};

use super::{
    context::LedgerContext,
    transaction::{TransactionBuilder, TransactionRef},
    transaction_list::TransactionList,
};
use crate::{
    currency::Currency,
    errors::{LedgerError, Result},
    events::{topics, Event, SubscriptionId},
    storage::{AccountId, AccountRecord},
    time::DateInput,
};

pub type AccountRef = Rc<Account>;

/// Membership registry of an account list; accounts only hold it weakly.
pub(crate) type Siblings = RefCell<Vec<AccountRef>>;

/// A named account holding transactions and a cached running balance.
///
/// The balance always equals the sum of the transaction amounts. Transactions
/// are fetched from the store the first time they are needed.
pub struct Account {
    id: AccountId,
    name: RefCell<String>,
    currency: Cell<Currency>,
    balance: Cell<f64>,
    transactions: RefCell<Option<TransactionList>>,
    siblings: RefCell<Weak<Siblings>>,
    subscription: Cell<Option<SubscriptionId>>,
    this: Weak<Account>,
    ctx: LedgerContext,
}

impl Account {
    /// Builds a live account from its stored record and announces it.
    pub fn new(record: AccountRecord, ctx: &LedgerContext) -> Result<AccountRef> {
        let currency = Currency::from_index(record.currency)?;
        let account = Rc::new_cyclic(|this| Account {
            id: record.id,
            name: RefCell::new(record.name),
            currency: Cell::new(currency),
            balance: Cell::new(record.balance),
            transactions: RefCell::new(None),
            siblings: RefCell::new(Weak::new()),
            subscription: Cell::new(None),
            this: this.clone(),
            ctx: ctx.clone(),
        });

        ctx.bus.publish(Event::AccountCreated(Rc::clone(&account)));

        let weak = Rc::downgrade(&account);
        let subscription = ctx
            .bus
            .subscribe(topics::TRANSACTION_AMOUNT_UPDATED, move |event| {
                if let (Some(account), Event::AmountUpdated { transaction, delta }) =
                    (weak.upgrade(), event)
                {
                    account.on_transaction_amount_changed(transaction, *delta);
                }
            });
        account.subscription.set(Some(subscription));
        debug!(account = %account.name(), id = %account.id, "account created");
        Ok(account)
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    pub fn currency(&self) -> Currency {
        self.currency.get()
    }

    pub fn set_currency(&self, currency: Currency) {
        self.currency.set(currency);
    }

    pub fn balance(&self) -> f64 {
        self.balance.get()
    }

    fn set_balance(&self, balance: f64) {
        self.balance.set(balance);
        if let Some(account) = self.this.upgrade() {
            self.ctx.bus.publish(Event::BalanceChanged(account));
        }
    }

    pub(crate) fn attach(&self, siblings: Weak<Siblings>) {
        *self.siblings.borrow_mut() = siblings;
    }

    pub(crate) fn detach(&self) {
        *self.siblings.borrow_mut() = Weak::new();
    }

    /// Renames the account, refusing names already used by a sibling.
    pub fn rename(&self, new_name: impl Into<String>) -> Result<()> {
        let new_name = new_name.into();
        if *self.name.borrow() == new_name {
            return Ok(());
        }
        let siblings = self.siblings.borrow().upgrade();
        let taken = siblings
            .as_ref()
            .is_some_and(|members| members.borrow().iter().any(|a| a.name() == new_name));
        if taken {
            warn!(account = %self.name(), %new_name, "rename rejected: name in use");
            return Err(LedgerError::AccountAlreadyExists(new_name));
        }
        self.ctx.store.rename_account(self, &new_name)?;

        let old_name = self.name.replace(new_name);
        debug!(%old_name, new_name = %self.name(), "account renamed");
        if let Some(account) = self.this.upgrade() {
            self.ctx
                .bus
                .publish(Event::AccountRenamed { old_name, account });
        }
        Ok(())
    }

    /// Snapshot of the transactions, loading them from the store on first use.
    pub fn transactions(&self) -> Result<TransactionList> {
        self.ensure_loaded()?;
        Ok(self.transactions.borrow().clone().unwrap_or_default())
    }

    pub fn is_loaded(&self) -> bool {
        self.transactions.borrow().is_some()
    }

    fn ensure_loaded(&self) -> Result<()> {
        if self.is_loaded() {
            return Ok(());
        }
        let records = self.ctx.store.get_transactions_from(self)?;
        let mut list = TransactionList::new();
        for record in records {
            list.push(TransactionBuilder::from_record(self.id, record).commit(&self.ctx)?);
        }
        debug!(account = %self.name(), count = list.len(), "transactions loaded");
        *self.transactions.borrow_mut() = Some(list);
        Ok(())
    }

    /// Records a transaction in this account and returns it.
    pub fn add_transaction(
        &self,
        amount: f64,
        description: impl ToString,
        date: impl Into<DateInput>,
    ) -> Result<TransactionRef> {
        self.ensure_loaded()?;
        let transaction = TransactionBuilder::new(self.id, amount)
            .description(description)
            .date(date)
            .commit(&self.ctx)?;
        let id = self.ctx.store.make_transaction(self, &transaction)?;
        transaction.set_id(id);

        self.transactions
            .borrow_mut()
            .get_or_insert_with(TransactionList::new)
            .push(Rc::clone(&transaction));

        let amount = transaction.amount();
        self.ctx.bus.publish(Event::TransactionCreated {
            account: self.name(),
            transaction: Rc::clone(&transaction),
        });
        self.set_balance(self.balance() + amount);
        debug!(account = %self.name(), %id, amount, "transaction recorded");
        Ok(transaction)
    }

    /// Moves `amount` from `source` into this account.
    ///
    /// The mirror transaction is recorded in `source` first. Returns this
    /// account's side followed by the source side.
    pub fn add_transfer(
        &self,
        source: &Account,
        amount: f64,
        description: &str,
        date: impl Into<DateInput>,
    ) -> Result<(TransactionRef, TransactionRef)> {
        let date = self.ctx.normalize_date(&date.into())?;
        self.ensure_loaded()?;
        source.ensure_loaded()?;

        let note = if description.is_empty() {
            String::new()
        } else {
            format!(" ({})", description)
        };
        let mirror = source.add_transaction(
            -amount,
            format!("Transfer to {}{}", self.name(), note),
            date,
        )?;
        match self.add_transaction(
            amount,
            format!("Transfer from {}{}", source.name(), note),
            date,
        ) {
            Ok(transaction) => Ok((transaction, mirror)),
            Err(err) => {
                if let Err(rollback) = source.remove_transaction(&mirror) {
                    warn!(account = %source.name(), error = %rollback, "transfer rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Removes `transaction`, which must belong to this account.
    pub fn remove_transaction(&self, transaction: &TransactionRef) -> Result<()> {
        self.ensure_loaded()?;
        let member = self
            .transactions
            .borrow()
            .as_ref()
            .is_some_and(|list| list.contains(transaction));
        if !member {
            return Err(LedgerError::InvalidTransaction(format!(
                "Transaction does not exist in account '{}'",
                self.name()
            )));
        }

        self.ctx.store.remove_transaction(transaction)?;
        self.ctx.bus.publish(Event::TransactionRemoved {
            account: self.name(),
            transaction: Rc::clone(transaction),
        });
        if let Some(list) = self.transactions.borrow_mut().as_mut() {
            list.remove(transaction);
        }
        self.set_balance(self.balance() - transaction.amount());
        debug!(account = %self.name(), id = ?transaction.id(), "transaction removed");
        Ok(())
    }

    fn on_transaction_amount_changed(&self, transaction: &TransactionRef, delta: f64) {
        if transaction.parent() != self.id {
            return;
        }
        let member = self
            .transactions
            .borrow()
            .as_ref()
            .is_some_and(|list| list.contains(transaction));
        if member {
            self.set_balance(self.balance() + delta);
            debug!(account = %self.name(), delta, "balance repaired after amount edit");
        }
    }

    /// Renders `value` in this account's currency.
    pub fn format_amount(&self, value: f64, min_width: usize) -> String {
        self.currency().format(value, min_width)
    }

    /// Name, balance, currency and transaction contents all match.
    pub fn equals(&self, other: &Account) -> Result<bool> {
        Ok(self.name() == other.name()
            && self.balance() == other.balance()
            && self.currency() == other.currency()
            && self.transactions()? == other.transactions()?)
    }

    /// Display order of accounts: by name.
    pub fn name_cmp(&self, other: &Account) -> Ordering {
        self.name.borrow().as_str().cmp(other.name.borrow().as_str())
    }
}

impl Drop for Account {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.ctx.bus.unsubscribe(subscription);
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &*self.name.borrow())
            .field("currency", &self.currency())
            .field("balance", &self.balance())
            .finish()
    }
}
