#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use chrono::NaiveDate;
use ledger_core::{
    events::EventBus,
    ledger::{AccountList, BankModel, LedgerContext},
    storage::MemoryStore,
    time::FixedClock,
};

/// A bank model over an in-memory store, with the clock pinned to `today`.
pub struct Fixture {
    pub ctx: LedgerContext,
    pub store: Rc<MemoryStore>,
    pub bank: BankModel,
}

pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

pub fn context_on(store: Rc<MemoryStore>, today: NaiveDate) -> LedgerContext {
    LedgerContext::new(store, EventBus::new(), Rc::new(FixedClock(today)))
}

pub fn fixture_on(today: NaiveDate) -> Fixture {
    let store = Rc::new(MemoryStore::new());
    let ctx = context_on(store.clone(), today);
    let bank = BankModel::new(&ctx, AccountList::new(&ctx));
    Fixture { ctx, store, bank }
}

pub fn fixture() -> Fixture {
    fixture_on(ymd(2008, 6, 15))
}

/// Collects the topics of every event matching `filter`, in publish order.
pub fn record_topics(bus: &EventBus, filter: &str) -> Rc<RefCell<Vec<String>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    bus.subscribe(filter, move |event| sink.borrow_mut().push(event.topic()));
    seen
}
