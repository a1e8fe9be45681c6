use std::{
    cell::Cell,
    rc::{Rc, Weak},
};

use tracing::{info, warn};

use super::{
    account::{AccountRef, Siblings},
    account_list::AccountList,
    context::LedgerContext,
    transaction::TransactionRef,
};
use crate::{
    analysis::{MonthlyAnalyzer, MonthlyTotal},
    currency::Currency,
    errors::Result,
    events::{topics, Event, SubscriptionId, WeakEventBus},
    storage::Store,
};

/// Applies currency changes; shared by the model and its request subscription.
struct CurrencySwitch {
    store: Rc<dyn Store>,
    bus: WeakEventBus,
    members: Weak<Siblings>,
    applying: Cell<bool>,
}

impl CurrencySwitch {
    fn apply(&self, index: usize) -> Result<()> {
        let currency = Currency::from_index(index)?;
        self.store.set_currency(index)?;
        let members = self.members.upgrade();
        let accounts: Vec<AccountRef> = members
            .as_ref()
            .map(|members| members.borrow().clone())
            .unwrap_or_default();
        for account in &accounts {
            account.set_currency(currency);
        }
        info!(currency = %currency, "currency changed");

        let outer = self.applying.replace(true);
        if let Some(bus) = self.bus.upgrade() {
            bus.publish(Event::CurrencyChanged(index));
        }
        self.applying.set(outer);
        Ok(())
    }

    /// Handles a `user.currency_changed` request. Requests echoed back while a
    /// change is being announced are dropped.
    fn request(&self, index: usize) {
        if self.applying.get() {
            warn!(index, "currency request ignored: a change is being announced");
            return;
        }
        if let Err(err) = self.apply(index) {
            warn!(index, error = %err, "requested currency change failed");
        }
    }
}

/// Top-level facade over the account list.
pub struct BankModel {
    ctx: LedgerContext,
    accounts: AccountList,
    currency: Rc<CurrencySwitch>,
    subscription: SubscriptionId,
}

impl BankModel {
    pub fn new(ctx: &LedgerContext, accounts: AccountList) -> Self {
        let currency = Rc::new(CurrencySwitch {
            store: Rc::clone(&ctx.store),
            bus: ctx.bus.downgrade(),
            members: accounts.members(),
            applying: Cell::new(false),
        });
        let switch = Rc::downgrade(&currency);
        let subscription = ctx
            .bus
            .subscribe(topics::CURRENCY_CHANGE_REQUESTED, move |event| {
                if let (Event::CurrencyChangeRequested(index), Some(switch)) =
                    (event, switch.upgrade())
                {
                    switch.request(*index);
                }
            });
        Self {
            ctx: ctx.clone(),
            accounts,
            currency,
            subscription,
        }
    }

    /// Opens the model over every account already in the store.
    pub fn load(ctx: &LedgerContext) -> Result<Self> {
        let accounts = AccountList::load(ctx)?;
        Ok(Self::new(ctx, accounts))
    }

    pub fn accounts(&self) -> &AccountList {
        &self.accounts
    }

    /// Sum of every account balance.
    pub fn balance(&self) -> f64 {
        self.accounts.balance()
    }

    pub fn get_account(&self, name: &str) -> Result<AccountRef> {
        self.accounts.get(name)
    }

    pub fn create_account(&self, name: &str) -> Result<AccountRef> {
        self.accounts.create(name)
    }

    pub fn remove_account(&self, name: &str) -> Result<AccountRef> {
        self.accounts.remove(name)
    }

    /// Persists the currency selection, applies it to every account and announces it.
    pub fn set_currency(&self, index: usize) -> Result<()> {
        self.currency.apply(index)
    }

    /// Renders a ledger-wide amount such as a total, using the first account's
    /// currency or the configured default when there are no accounts.
    pub fn format_amount(&self, value: f64, min_width: usize) -> String {
        let currency = self
            .accounts
            .first()
            .map(|account| account.currency())
            .unwrap_or(self.ctx.default_currency);
        currency.format(value, min_width)
    }

    /// Every transaction of every account.
    pub fn transactions(&self) -> Result<Vec<TransactionRef>> {
        let mut all = Vec::new();
        for account in self.accounts.accounts() {
            all.extend(account.transactions()?.iter().cloned());
        }
        Ok(all)
    }

    /// Monthly totals over the `months` complete months before today.
    pub fn monthly_earnings(&self, months: u32) -> Result<Vec<MonthlyTotal>> {
        let analyzer = MonthlyAnalyzer::new(months, self.ctx.clock.as_ref());
        Ok(analyzer.earnings(&self.transactions()?))
    }

    /// Monthly totals over the configured trailing window.
    pub fn recent_earnings(&self) -> Result<Vec<MonthlyTotal>> {
        self.monthly_earnings(self.ctx.analysis_months)
    }

    pub fn equals(&self, other: &BankModel) -> Result<bool> {
        self.accounts.equals(&other.accounts)
    }
}

impl Drop for BankModel {
    fn drop(&mut self) {
        self.ctx.bus.unsubscribe(self.subscription);
    }
}
