#![doc(test(attr(deny(warnings))))]

//! Ledger Core keeps named accounts and their transactions in step: every
//! account's cached balance equals the sum of its transactions, and every
//! mutation is announced on a synchronous event bus.

pub mod analysis;
pub mod config;
pub mod currency;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod storage;
pub mod time;
pub mod utils;

pub use errors::{LedgerError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Ledger Core tracing initialized.");
    });
}
