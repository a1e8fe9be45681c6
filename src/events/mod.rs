//! Synchronous publish/subscribe channel shared by the ledger objects.
//!
//! Every publish invokes the matching subscribers before returning. Topics are
//! dot-separated and subscriptions match on whole leading segments, so a
//! subscriber to `account` sees `account.created.Checking`.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use crate::ledger::{AccountRef, TransactionRef};

pub mod topics {
    pub const ACCOUNT_CREATED: &str = "account.created";
    pub const ACCOUNT_RENAMED: &str = "account.renamed";
    pub const ACCOUNT_REMOVED: &str = "account.removed";
    pub const ACCOUNT_BALANCE_CHANGED: &str = "account.balance_changed";
    pub const TRANSACTION_CREATED: &str = "transaction.created";
    pub const TRANSACTION_REMOVED: &str = "transaction.removed";
    pub const TRANSACTION_DATE_UPDATED: &str = "transaction.updated.date";
    pub const TRANSACTION_DESCRIPTION_UPDATED: &str = "transaction.updated.description";
    pub const TRANSACTION_AMOUNT_UPDATED: &str = "transaction.updated.amount";
    pub const CURRENCY_CHANGED: &str = "currency_changed";
    pub const CURRENCY_CHANGE_REQUESTED: &str = "user.currency_changed";
}

/// Everything the ledger core announces.
#[derive(Clone)]
pub enum Event {
    AccountCreated(AccountRef),
    AccountRenamed { old_name: String, account: AccountRef },
    AccountRemoved(AccountRef),
    BalanceChanged(AccountRef),
    TransactionCreated { account: String, transaction: TransactionRef },
    TransactionRemoved { account: String, transaction: TransactionRef },
    DateUpdated(TransactionRef),
    DescriptionUpdated(TransactionRef),
    AmountUpdated { transaction: TransactionRef, delta: f64 },
    CurrencyChanged(usize),
    /// Asks the bank model to switch currency; published by outside collaborators.
    CurrencyChangeRequested(usize),
}

impl Event {
    /// Full topic, including the account-name scope where one applies.
    pub fn topic(&self) -> String {
        match self {
            Event::AccountCreated(account) => scoped(topics::ACCOUNT_CREATED, &account.name()),
            Event::AccountRenamed { old_name, .. } => scoped(topics::ACCOUNT_RENAMED, old_name),
            Event::AccountRemoved(account) => scoped(topics::ACCOUNT_REMOVED, &account.name()),
            Event::BalanceChanged(account) => {
                scoped(topics::ACCOUNT_BALANCE_CHANGED, &account.name())
            }
            Event::TransactionCreated { account, .. } => {
                scoped(topics::TRANSACTION_CREATED, account)
            }
            Event::TransactionRemoved { account, .. } => {
                scoped(topics::TRANSACTION_REMOVED, account)
            }
            Event::DateUpdated(_) => topics::TRANSACTION_DATE_UPDATED.into(),
            Event::DescriptionUpdated(_) => topics::TRANSACTION_DESCRIPTION_UPDATED.into(),
            Event::AmountUpdated { .. } => topics::TRANSACTION_AMOUNT_UPDATED.into(),
            Event::CurrencyChanged(_) => topics::CURRENCY_CHANGED.into(),
            Event::CurrencyChangeRequested(_) => topics::CURRENCY_CHANGE_REQUESTED.into(),
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.topic())
    }
}

fn scoped(topic: &str, name: &str) -> String {
    format!("{}.{}", topic, name)
}

/// Returns true when `filter` names `topic` or one of its leading segments.
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    filter.is_empty()
        || topic == filter
        || (topic.starts_with(filter) && topic[filter.len()..].starts_with('.'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&Event)>;

struct Subscriber {
    id: SubscriptionId,
    filter: String,
    handler: Handler,
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// Cheaply clonable handle onto one shared subscriber registry.
#[derive(Clone, Default)]
pub struct EventBus {
    state: Rc<RefCell<BusState>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for every event whose topic matches `filter`.
    pub fn subscribe<F>(&self, filter: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + 'static,
    {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = SubscriptionId(state.next_id);
        state.subscribers.push(Subscriber {
            id,
            filter: filter.into(),
            handler: Rc::new(handler),
        });
        id
    }

    /// Removes a subscription. Returns false when it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = {
            let mut state = self.state.borrow_mut();
            let pos = state
                .subscribers
                .iter()
                .position(|subscriber| subscriber.id == id);
            pos.map(|pos| state.subscribers.remove(pos))
        };
        // The handler may own objects that unsubscribe on drop; release it unborrowed.
        removed.is_some()
    }

    /// Delivers `event` to every matching subscriber, in subscription order.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        let handlers: Vec<Handler> = self
            .state
            .borrow()
            .subscribers
            .iter()
            .filter(|subscriber| topic_matches(&subscriber.filter, &topic))
            .map(|subscriber| Rc::clone(&subscriber.handler))
            .collect();
        tracing::trace!(topic = %topic, subscribers = handlers.len(), "publishing event");
        for handler in handlers {
            handler(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().subscribers.len()
    }

    /// Handle for subscribers that must not keep the bus alive.
    pub fn downgrade(&self) -> WeakEventBus {
        WeakEventBus {
            state: Rc::downgrade(&self.state),
        }
    }
}

#[derive(Clone, Default)]
pub struct WeakEventBus {
    state: Weak<RefCell<BusState>>,
}

impl WeakEventBus {
    pub fn upgrade(&self) -> Option<EventBus> {
        self.state.upgrade().map(|state| EventBus { state })
    }
}
