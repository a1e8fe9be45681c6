use std::{fmt, rc::Rc, slice};

use super::transaction::TransactionRef;

/// Ordered transactions of one account.
///
/// Equality is pairwise content equality in the current order.
#[derive(Clone, Default)]
pub struct TransactionList {
    items: Vec<TransactionRef>,
}

impl TransactionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, TransactionRef> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&TransactionRef> {
        self.items.get(index)
    }

    /// Membership by identity, not by content.
    pub fn contains(&self, transaction: &TransactionRef) -> bool {
        self.items.iter().any(|item| Rc::ptr_eq(item, transaction))
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.amount()).sum()
    }

    /// Copy of the handles in ledger order.
    pub fn sorted(&self) -> Vec<TransactionRef> {
        let mut items = self.items.clone();
        items.sort_by(|a, b| a.ledger_cmp(b));
        items
    }

    pub fn as_slice(&self) -> &[TransactionRef] {
        &self.items
    }

    pub(crate) fn push(&mut self, transaction: TransactionRef) {
        self.items.push(transaction);
    }

    pub(crate) fn remove(&mut self, transaction: &TransactionRef) -> bool {
        match self.items.iter().position(|item| Rc::ptr_eq(item, transaction)) {
            Some(pos) => {
                self.items.remove(pos);
                true
            }
            None => false,
        }
    }
}

impl PartialEq for TransactionList {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .items
                .iter()
                .zip(&other.items)
                .all(|(left, right)| left.content_eq(right))
    }
}

impl fmt::Debug for TransactionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a TransactionList {
    type Item = &'a TransactionRef;
    type IntoIter = slice::Iter<'a, TransactionRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Vec<TransactionRef>> for TransactionList {
    fn from(items: Vec<TransactionRef>) -> Self {
        Self { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::EventBus,
        ledger::{context::LedgerContext, transaction::TransactionBuilder},
        storage::MemoryStore,
        time::FixedClock,
    };
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn context() -> LedgerContext {
        LedgerContext::new(
            Rc::new(MemoryStore::new()),
            EventBus::new(),
            Rc::new(FixedClock(NaiveDate::from_ymd_opt(2009, 3, 10).unwrap())),
        )
    }

    fn txn(ctx: &LedgerContext, amount: f64, date: &str) -> TransactionRef {
        TransactionBuilder::new(Uuid::new_v4(), amount)
            .date(date)
            .commit(ctx)
            .unwrap()
    }

    #[test]
    fn equality_is_pairwise_and_order_sensitive() {
        let ctx = context();
        let a = txn(&ctx, 1.0, "2009-01-01");
        let b = txn(&ctx, 2.0, "2009-01-02");
        let left = TransactionList::from(vec![Rc::clone(&a), Rc::clone(&b)]);
        let same = TransactionList::from(vec![
            txn(&ctx, 1.0, "2009-01-01"),
            txn(&ctx, 2.0, "2009-01-02"),
        ]);
        let swapped = TransactionList::from(vec![Rc::clone(&b), Rc::clone(&a)]);
        let shorter = TransactionList::from(vec![a]);
        assert_eq!(left, same);
        assert_ne!(left, swapped);
        assert_ne!(left, shorter);
    }

    #[test]
    fn membership_uses_identity() {
        let ctx = context();
        let a = txn(&ctx, 1.0, "2009-01-01");
        let twin = txn(&ctx, 1.0, "2009-01-01");
        let mut list = TransactionList::from(vec![Rc::clone(&a)]);
        assert!(list.contains(&a));
        assert!(!list.contains(&twin));
        assert!(!list.remove(&twin));
        assert!(list.remove(&a));
        assert!(list.is_empty());
    }

    #[test]
    fn sorted_and_total() {
        let ctx = context();
        let list = TransactionList::from(vec![
            txn(&ctx, 5.0, "2009-02-20"),
            txn(&ctx, 100.0, "2009-01-01"),
            txn(&ctx, 10.0, "2009-02-05"),
        ]);
        let amounts: Vec<f64> = list.sorted().iter().map(|t| t.amount()).collect();
        assert_eq!(amounts, vec![100.0, 10.0, 5.0]);
        assert_eq!(list.total(), 115.0);
    }
}
