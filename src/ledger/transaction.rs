use std::{
    cell::{Cell, RefCell},
    cmp::Ordering,
    fmt,
    rc::Rc,
};

use chrono::{Datelike, NaiveDate};

use super::context::LedgerContext;
use crate::{
    errors::Result,
    events::Event,
    storage::{AccountId, TransactionId, TransactionRecord},
    time::DateInput,
};

pub type TransactionRef = Rc<Transaction>;

/// A single ledger entry owned by one account.
///
/// Setters publish `transaction.updated.*` events; the owning account listens
/// for amount updates to keep its balance in step.
pub struct Transaction {
    id: Cell<Option<TransactionId>>,
    parent: AccountId,
    date: Cell<NaiveDate>,
    description: RefCell<String>,
    amount: Cell<f64>,
    ctx: LedgerContext,
}

/// Collects a transaction's fields before it goes live.
///
/// Nothing is published while building; [`TransactionBuilder::commit`] resolves
/// the date and hands back a transaction whose setters emit events.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    id: Option<TransactionId>,
    parent: AccountId,
    amount: f64,
    description: String,
    date: DateInput,
}

impl TransactionBuilder {
    pub fn new(parent: AccountId, amount: f64) -> Self {
        Self {
            id: None,
            parent,
            amount,
            description: String::new(),
            date: DateInput::Today,
        }
    }

    pub fn from_record(parent: AccountId, record: TransactionRecord) -> Self {
        Self {
            id: Some(record.id),
            parent,
            amount: record.amount,
            description: record.description,
            date: DateInput::Date(record.date),
        }
    }

    pub fn description(mut self, description: impl ToString) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn date(mut self, date: impl Into<DateInput>) -> Self {
        self.date = date.into();
        self
    }

    pub fn commit(self, ctx: &LedgerContext) -> Result<TransactionRef> {
        let date = ctx.normalize_date(&self.date)?;
        Ok(Rc::new(Transaction {
            id: Cell::new(self.id),
            parent: self.parent,
            date: Cell::new(date),
            description: RefCell::new(self.description),
            amount: Cell::new(self.amount),
            ctx: ctx.clone(),
        }))
    }
}

impl Transaction {
    /// Identity assigned by the store; `None` until persisted.
    pub fn id(&self) -> Option<TransactionId> {
        self.id.get()
    }

    pub(crate) fn set_id(&self, id: TransactionId) {
        self.id.set(Some(id));
    }

    pub fn parent(&self) -> AccountId {
        self.parent
    }

    pub fn date(&self) -> NaiveDate {
        self.date.get()
    }

    pub fn description(&self) -> String {
        self.description.borrow().clone()
    }

    pub fn amount(&self) -> f64 {
        self.amount.get()
    }

    /// Persisted shape of the transaction; `None` until the store assigned an id.
    pub fn record(&self) -> Option<TransactionRecord> {
        Some(TransactionRecord {
            id: self.id()?,
            amount: self.amount(),
            description: self.description(),
            date: self.date(),
        })
    }

    /// Writes the edited record through to the store before the edit goes live.
    fn persist(&self, edit: impl FnOnce(&mut TransactionRecord)) -> Result<()> {
        if let Some(mut record) = self.record() {
            edit(&mut record);
            self.ctx.store.update_transaction(&record)?;
        }
        Ok(())
    }

    pub fn set_date(self: &Rc<Self>, date: impl Into<DateInput>) -> Result<()> {
        let date = self.ctx.normalize_date(&date.into())?;
        self.persist(|record| record.date = date)?;
        self.date.set(date);
        self.ctx.bus.publish(Event::DateUpdated(Rc::clone(self)));
        Ok(())
    }

    pub fn set_description(self: &Rc<Self>, description: impl ToString) -> Result<()> {
        let description = description.to_string();
        self.persist(|record| record.description = description.clone())?;
        *self.description.borrow_mut() = description;
        self.ctx
            .bus
            .publish(Event::DescriptionUpdated(Rc::clone(self)));
        Ok(())
    }

    /// Changes the amount and announces the difference to the previous value.
    pub fn set_amount(self: &Rc<Self>, amount: f64) -> Result<()> {
        self.persist(|record| record.amount = amount)?;
        let delta = amount - self.amount.replace(amount);
        self.ctx.bus.publish(Event::AmountUpdated {
            transaction: Rc::clone(self),
            delta,
        });
        Ok(())
    }

    /// Content equality: date, description and amount. Identity and owner are ignored.
    pub fn content_eq(&self, other: &Transaction) -> bool {
        self.date() == other.date()
            && *self.description.borrow() == *other.description.borrow()
            && self.amount() == other.amount()
    }

    /// Ledger order: date, then amount, then description, then owning account.
    pub fn ledger_cmp(&self, other: &Transaction) -> Ordering {
        self.date()
            .cmp(&other.date())
            .then_with(|| self.amount().total_cmp(&other.amount()))
            .then_with(|| {
                self.description
                    .borrow()
                    .as_str()
                    .cmp(other.description.borrow().as_str())
            })
            .then_with(|| self.parent.cmp(&other.parent))
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self.date();
        write!(
            f,
            "{}/{}/{}: {} -- {:.2}",
            date.year(),
            date.month(),
            date.day(),
            self.description.borrow(),
            self.amount()
        )
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id())
            .field("parent", &self.parent)
            .field("date", &self.date())
            .field("description", &*self.description.borrow())
            .field("amount", &self.amount())
            .finish()
    }
}
