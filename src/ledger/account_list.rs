use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use super::{
    account::{Account, AccountRef, Siblings},
    context::LedgerContext,
};
use crate::{
    errors::{LedgerError, Result},
    events::Event,
};

/// Uniquely named accounts, in creation order.
pub struct AccountList {
    ctx: LedgerContext,
    members: Rc<Siblings>,
}

impl AccountList {
    pub fn new(ctx: &LedgerContext) -> Self {
        Self {
            ctx: ctx.clone(),
            members: Rc::default(),
        }
    }

    /// Rebuilds the list from every account the store knows about.
    pub fn load(ctx: &LedgerContext) -> Result<Self> {
        let list = Self::new(ctx);
        for record in ctx.store.get_accounts()? {
            let account = Account::new(record, ctx)?;
            account.attach(Rc::downgrade(&list.members));
            list.members.borrow_mut().push(account);
        }
        debug!(count = list.len(), "accounts loaded");
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    /// Snapshot of the member handles.
    pub fn accounts(&self) -> Vec<AccountRef> {
        self.members.borrow().clone()
    }

    pub fn first(&self) -> Option<AccountRef> {
        self.members.borrow().first().cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.members.borrow().iter().map(|a| a.name()).collect()
    }

    /// Members ordered by name.
    pub fn sorted_by_name(&self) -> Vec<AccountRef> {
        let mut accounts = self.accounts();
        accounts.sort_by(|a, b| a.name_cmp(b));
        accounts
    }

    pub fn balance(&self) -> f64 {
        self.members.borrow().iter().map(|a| a.balance()).sum()
    }

    /// Position of the account named exactly `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.members.borrow().iter().position(|a| a.name() == name)
    }

    pub fn get(&self, name: &str) -> Result<AccountRef> {
        let index = self
            .index_of(name)
            .ok_or_else(|| LedgerError::InvalidAccount(name.to_string()))?;
        Ok(Rc::clone(&self.members.borrow()[index]))
    }

    pub fn create(&self, name: &str) -> Result<AccountRef> {
        if self.index_of(name).is_some() {
            warn!(account = name, "create rejected: name in use");
            return Err(LedgerError::AccountAlreadyExists(name.to_string()));
        }
        let record = self.ctx.store.create_account(name)?;
        let account = Account::new(record, &self.ctx)?;
        // Creation subscribers run before the push and may have claimed the name.
        if self.index_of(name).is_some() {
            warn!(account = name, "create rejected: name claimed during creation");
            self.ctx.store.remove_account(&account)?;
            return Err(LedgerError::AccountAlreadyExists(name.to_string()));
        }
        account.attach(Rc::downgrade(&self.members));
        self.members.borrow_mut().push(Rc::clone(&account));
        Ok(account)
    }

    /// Detaches and deletes the named account, returning its handle.
    pub fn remove(&self, name: &str) -> Result<AccountRef> {
        let index = self
            .index_of(name)
            .ok_or_else(|| LedgerError::InvalidAccount(name.to_string()))?;
        let account = Rc::clone(&self.members.borrow()[index]);
        self.ctx.store.remove_account(&account)?;
        self.members.borrow_mut().remove(index);
        account.detach();
        debug!(account = name, "account removed");
        self.ctx
            .bus
            .publish(Event::AccountRemoved(Rc::clone(&account)));
        Ok(account)
    }

    /// Same length and pairwise-equal accounts, in order.
    pub fn equals(&self, other: &AccountList) -> Result<bool> {
        let left = self.accounts();
        let right = other.accounts();
        if left.len() != right.len() {
            return Ok(false);
        }
        for (a, b) in left.iter().zip(&right) {
            if !a.equals(b)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub(crate) fn members(&self) -> Weak<Siblings> {
        Rc::downgrade(&self.members)
    }
}
