use std::rc::Rc;

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ledger_core::{
    analysis::MonthlyAnalyzer,
    currency::Currency,
    ledger::{LedgerContext, TransactionBuilder, TransactionRef},
    storage::MemoryStore,
};
use uuid::Uuid;

fn sample_transactions(count: usize) -> Vec<TransactionRef> {
    let ctx = LedgerContext::with_store(Rc::new(MemoryStore::new()));
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("start date");
    let account = Uuid::new_v4();
    (0..count)
        .map(|idx| {
            TransactionBuilder::new(account, 10.0 + (idx % 100) as f64)
                .date(start + Duration::days((idx % 730) as i64))
                .commit(&ctx)
                .expect("commit transaction")
        })
        .collect()
}

fn bench_money_strings(c: &mut Criterion) {
    let amounts: Vec<f64> = (0..1_000).map(|n| (n as f64 * 1234.57) - 50_000.0).collect();

    c.bench_function("format_1k_usd", |b| {
        b.iter(|| {
            for amount in &amounts {
                black_box(Currency::Usd.format(*amount, 12));
            }
        })
    });

    let rendered: Vec<String> = amounts.iter().map(|a| Currency::Brl.format(*a, 0)).collect();
    c.bench_function("parse_1k_brl", |b| {
        b.iter(|| {
            for text in &rendered {
                black_box(Currency::Brl.parse(text).expect("parse"));
            }
        })
    });
}

fn bench_monthly_earnings(c: &mut Criterion) {
    let transactions = sample_transactions(10_000);
    let analyzer =
        MonthlyAnalyzer::with_today(12, NaiveDate::from_ymd_opt(2025, 6, 15).expect("today"));
    c.bench_function("monthly_earnings_10k", |b| {
        b.iter(|| black_box(analyzer.earnings(&transactions)))
    });
}

criterion_group!(benches, bench_money_strings, bench_monthly_earnings);
criterion_main!(benches);
