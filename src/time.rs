//! Clock abstraction and date normalization for user-entered dates.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::errors::{LedgerError, Result};

/// How many years ahead an abbreviated year may point before it is read as
/// belonging to the previous century.
pub const DEFAULT_FUTURE_YEAR_WINDOW: i32 = 10;

/// Clock abstracts access to the current timestamp so the ledger stays deterministic in tests.
pub trait Clock {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC date. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Anything that can be turned into a transaction date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Today,
    Date(NaiveDate),
    Text(String),
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        DateInput::Date(date)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        DateInput::Text(text.to_string())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        DateInput::Text(text)
    }
}

impl<T: Into<DateInput>> From<Option<T>> for DateInput {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DateInput::Today)
    }
}

/// Resolves `input` to a calendar date relative to `today`.
///
/// Text uses `year-month-day` order with `-` or `/` separators. Years below 100
/// are abbreviations: anything up to `future_window` years past the current
/// two-digit year lands in this century, everything else in the previous one.
pub fn normalize_date(input: &DateInput, today: NaiveDate, future_window: i32) -> Result<NaiveDate> {
    let text = match input {
        DateInput::Today => return Ok(today),
        DateInput::Date(date) => return Ok(*date),
        DateInput::Text(text) => text,
    };
    let invalid = || LedgerError::InvalidDate(text.clone());

    let canonical = text.trim().replace('/', "-");
    let parts = canonical
        .split('-')
        .map(|part| part.trim().parse::<i32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    let [year, month, day] = parts[..] else {
        return Err(invalid());
    };
    if month < 1 || day < 1 {
        return Err(invalid());
    }

    let year = expand_year(year, today.year(), future_window);
    NaiveDate::from_ymd_opt(year, month as u32, day as u32).ok_or_else(invalid)
}

fn expand_year(year: i32, current_year: i32, future_window: i32) -> i32 {
    if year >= 100 {
        return year;
    }
    let current_abbrev = current_year % 100;
    let current_century = current_year / 100;
    if year <= current_abbrev + future_window {
        current_century * 100 + year
    } else {
        (current_century - 1) * 100 + year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn normalize(text: &str, today: NaiveDate) -> Result<NaiveDate> {
        normalize_date(&DateInput::from(text), today, DEFAULT_FUTURE_YEAR_WINDOW)
    }

    #[test]
    fn expands_abbreviated_years_around_today() {
        let today = ymd(2008, 6, 15);
        assert_eq!(normalize("08-01-06", today).unwrap(), ymd(2008, 1, 6));
        assert_eq!(normalize("18-01-06", today).unwrap(), ymd(2018, 1, 6));
        assert_eq!(normalize("19-01-06", today).unwrap(), ymd(1919, 1, 6));
        assert_eq!(normalize("99-01-06", today).unwrap(), ymd(1999, 1, 6));
        assert_eq!(normalize("00-01-06", today).unwrap(), ymd(2000, 1, 6));
        assert_eq!(normalize("86-01-06", today).unwrap(), ymd(1986, 1, 6));
    }

    #[test]
    fn accepts_both_separators_and_short_fields() {
        let today = ymd(2008, 6, 15);
        assert_eq!(normalize("2008-01-06", today).unwrap(), ymd(2008, 1, 6));
        assert_eq!(normalize("2008/01/06", today).unwrap(), ymd(2008, 1, 6));
        assert_eq!(normalize("0-1-6", today).unwrap(), ymd(2000, 1, 6));
        assert_eq!(normalize("0/1/6", today).unwrap(), ymd(2000, 1, 6));
    }

    #[test]
    fn passes_dates_through_and_defaults_to_today() {
        let today = ymd(2008, 6, 15);
        let date = ymd(2001, 2, 3);
        assert_eq!(normalize_date(&DateInput::Date(date), today, 10).unwrap(), date);
        assert_eq!(normalize_date(&DateInput::Today, today, 10).unwrap(), today);
        assert_eq!(
            normalize_date(&DateInput::from(None::<&str>), today, 10).unwrap(),
            today
        );
    }

    #[test]
    fn rejects_malformed_or_out_of_range_input() {
        let today = ymd(2008, 6, 15);
        for text in ["", "2008-01", "2008-13-01", "2008-02-30", "a-b-c", "2008-01-06-01", "2008--1-06"] {
            let err = normalize(text, today).expect_err(text);
            assert!(matches!(err, LedgerError::InvalidDate(_)), "{text}: {err:?}");
        }
    }

    #[test]
    fn fixed_clock_reports_its_day() {
        let clock = FixedClock(ymd(2009, 3, 10));
        assert_eq!(clock.today(), ymd(2009, 3, 10));
        assert_eq!(clock.now().date_naive(), ymd(2009, 3, 10));
    }
}
