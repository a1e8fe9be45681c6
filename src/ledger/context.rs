use std::rc::Rc;

use chrono::NaiveDate;

use crate::{
    config::{Config, DEFAULT_ANALYSIS_MONTHS},
    currency::Currency,
    errors::Result,
    events::EventBus,
    storage::Store,
    time::{normalize_date, Clock, DateInput, SystemClock, DEFAULT_FUTURE_YEAR_WINDOW},
};

/// Collaborators handed to every ledger object when it is built.
#[derive(Clone)]
pub struct LedgerContext {
    pub store: Rc<dyn Store>,
    pub bus: EventBus,
    pub clock: Rc<dyn Clock>,
    /// Currency used for ledger-wide amounts while no account exists.
    pub default_currency: Currency,
    pub future_year_window: i32,
    /// Trailing window, in months, for ledger-wide earnings reports.
    pub analysis_months: u32,
}

impl LedgerContext {
    pub fn new(store: Rc<dyn Store>, bus: EventBus, clock: Rc<dyn Clock>) -> Self {
        Self {
            store,
            bus,
            clock,
            default_currency: Currency::default(),
            future_year_window: DEFAULT_FUTURE_YEAR_WINDOW,
            analysis_months: DEFAULT_ANALYSIS_MONTHS,
        }
    }

    /// Context on the system clock with a fresh event bus.
    pub fn with_store(store: Rc<dyn Store>) -> Self {
        Self::new(store, EventBus::new(), Rc::new(SystemClock))
    }

    pub fn with_config(mut self, config: &Config) -> Result<Self> {
        self.default_currency = config.currency()?;
        self.future_year_window = config.future_year_window;
        self.analysis_months = config.analysis_months;
        Ok(self)
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn normalize_date(&self, input: &DateInput) -> Result<NaiveDate> {
        normalize_date(input, self.today(), self.future_year_window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::LedgerError, storage::MemoryStore, time::FixedClock};

    fn context() -> LedgerContext {
        LedgerContext::new(
            Rc::new(MemoryStore::new()),
            EventBus::new(),
            Rc::new(FixedClock(NaiveDate::from_ymd_opt(2008, 6, 15).unwrap())),
        )
    }

    #[test]
    fn config_overrides_defaults() {
        let config = Config {
            currency: 3,
            future_year_window: 0,
            analysis_months: 3,
        };
        let ctx = context().with_config(&config).unwrap();
        assert_eq!(ctx.default_currency, Currency::Brl);
        assert_eq!(ctx.analysis_months, 3);
        // With no look-ahead, "09" is already last century.
        assert_eq!(
            ctx.normalize_date(&DateInput::from("09-01-01")).unwrap(),
            NaiveDate::from_ymd_opt(1909, 1, 1).unwrap()
        );
    }

    #[test]
    fn config_with_unknown_currency_is_refused() {
        let config = Config {
            currency: 12,
            ..Config::default()
        };
        assert!(matches!(
            context().with_config(&config),
            Err(LedgerError::InvalidCurrency(12))
        ));
    }
}
