//! Periodic aggregation of transactions.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::{ledger::TransactionRef, time::Clock};

/// Accumulated amount of one calendar month, keyed `YYYY.MM`.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    pub month: String,
    pub total: f64,
}

/// Buckets transactions into the complete calendar months preceding today.
#[derive(Debug, Clone, Copy)]
pub struct MonthlyAnalyzer {
    today: NaiveDate,
    months: u32,
}

impl MonthlyAnalyzer {
    pub fn new(months: u32, clock: &dyn Clock) -> Self {
        Self::with_today(months, clock.today())
    }

    pub fn with_today(months: u32, today: NaiveDate) -> Self {
        Self { today, months }
    }

    /// First day of the month `months` back through the last day of last month.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        let month_start = self.today - Duration::days(i64::from(self.today.day0()));
        let start = month_start
            .checked_sub_months(Months::new(self.months))
            .unwrap_or(NaiveDate::MIN);
        let end = month_start.pred_opt().unwrap_or(month_start);
        (start, end)
    }

    pub fn earnings(&self, transactions: &[TransactionRef]) -> Vec<MonthlyTotal> {
        let (start, end) = self.date_range();
        let mut sorted = transactions.to_vec();
        sorted.sort_by(|a, b| a.ledger_cmp(b));

        let mut buckets: BTreeMap<String, f64> = BTreeMap::new();
        for transaction in &sorted {
            let date = transaction.date();
            if date < start {
                continue;
            }
            if date > end {
                break;
            }
            let key = format!("{}.{:02}", date.year(), date.month());
            *buckets.entry(key).or_insert(0.0) += transaction.amount();
        }
        buckets
            .into_iter()
            .map(|(month, total)| MonthlyTotal { month, total })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::EventBus,
        ledger::{LedgerContext, TransactionBuilder},
        storage::MemoryStore,
        time::FixedClock,
    };
    use std::rc::Rc;
    use uuid::Uuid;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn transactions(entries: &[(&str, f64)]) -> Vec<TransactionRef> {
        let ctx = LedgerContext::new(
            Rc::new(MemoryStore::new()),
            EventBus::new(),
            Rc::new(FixedClock(ymd(2009, 3, 10))),
        );
        entries
            .iter()
            .map(|(date, amount)| {
                TransactionBuilder::new(Uuid::new_v4(), *amount)
                    .date(*date)
                    .commit(&ctx)
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn range_covers_complete_previous_months() {
        let analyzer = MonthlyAnalyzer::with_today(12, ymd(2009, 3, 10));
        assert_eq!(analyzer.date_range(), (ymd(2008, 3, 1), ymd(2009, 2, 28)));
        let one = MonthlyAnalyzer::with_today(1, ymd(2008, 3, 31));
        assert_eq!(one.date_range(), (ymd(2008, 2, 1), ymd(2008, 2, 29)));
    }

    #[test]
    fn single_month_window_buckets_last_month() {
        let txns = transactions(&[
            ("2009-02-05", 10.0),
            ("2009-02-20", 5.0),
            ("2009-01-01", 100.0),
        ]);
        let analyzer = MonthlyAnalyzer::new(1, &FixedClock(ymd(2009, 3, 10)));
        assert_eq!(
            analyzer.earnings(&txns),
            vec![MonthlyTotal {
                month: "2009.02".into(),
                total: 15.0
            }]
        );
    }

    #[test]
    fn buckets_are_sorted_and_ignore_current_month() {
        let txns = transactions(&[
            ("2009-03-01", 999.0),
            ("2008-12-31", 1.0),
            ("2009-02-01", 2.0),
            ("2008-12-01", 3.0),
            ("2008-11-30", 50.0),
        ]);
        let analyzer = MonthlyAnalyzer::with_today(3, ymd(2009, 3, 10));
        let months: Vec<(String, f64)> = analyzer
            .earnings(&txns)
            .into_iter()
            .map(|bucket| (bucket.month, bucket.total))
            .collect();
        assert_eq!(
            months,
            vec![("2008.12".to_string(), 4.0), ("2009.02".to_string(), 2.0)]
        );
    }
}
