use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

/// Currencies the ledger knows how to render. The position in [`Currency::ALL`]
/// is the index persisted by the store and carried by currency-change events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Brl,
}

/// Symbol and separator rules for one currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyRules {
    pub symbol: &'static str,
    pub grouping_separator: char,
    pub decimal_separator: char,
    pub short_name: &'static str,
    pub long_name: &'static str,
}

const USD: CurrencyRules = CurrencyRules {
    symbol: "$",
    grouping_separator: ',',
    decimal_separator: '.',
    short_name: "USD",
    long_name: "United States Dollar",
};

const EUR: CurrencyRules = CurrencyRules {
    symbol: "€",
    grouping_separator: ' ',
    decimal_separator: ',',
    short_name: "EUR",
    long_name: "Euro",
};

const GBP: CurrencyRules = CurrencyRules {
    symbol: "£",
    grouping_separator: ',',
    decimal_separator: '.',
    short_name: "GBP",
    long_name: "British Pound",
};

const BRL: CurrencyRules = CurrencyRules {
    symbol: "R$",
    grouping_separator: '.',
    decimal_separator: ',',
    short_name: "BRL",
    long_name: "Brazilian Real",
};

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Gbp, Currency::Brl];

    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(LedgerError::InvalidCurrency(index))
    }

    pub fn index(self) -> usize {
        match self {
            Currency::Usd => 0,
            Currency::Eur => 1,
            Currency::Gbp => 2,
            Currency::Brl => 3,
        }
    }

    pub fn rules(self) -> &'static CurrencyRules {
        match self {
            Currency::Usd => &USD,
            Currency::Eur => &EUR,
            Currency::Gbp => &GBP,
            Currency::Brl => &BRL,
        }
    }

    pub fn symbol(self) -> &'static str {
        self.rules().symbol
    }

    pub fn short_name(self) -> &'static str {
        self.rules().short_name
    }

    pub fn long_name(self) -> &'static str {
        self.rules().long_name
    }

    /// Renders `amount` as a money string, right-justified to `min_width` characters.
    ///
    /// Amounts are always shown with two decimals and never as a negative zero.
    pub fn format(self, amount: f64, min_width: usize) -> String {
        let rules = self.rules();
        let mut body = format!("{:.2}", amount);
        if body == "-0.00" {
            body = "0.00".into();
        }
        if let Some(pos) = body.find('.') {
            let mut int_part = body[..pos].to_string();
            insert_grouping(&mut int_part, rules.grouping_separator);
            body = format!("{}{}{}", int_part, rules.decimal_separator, &body[pos + 1..]);
        }
        let money = format!("{}{}", rules.symbol, body);
        format!("{:>width$}", money, width = min_width)
    }

    /// Parses a money string produced by [`Currency::format`] (or typed by a user)
    /// back into an amount.
    pub fn parse(self, text: &str) -> Result<f64> {
        let rules = self.rules();
        let trimmed = text.trim();
        let unsigned = trimmed.strip_prefix(rules.symbol).unwrap_or(trimmed);
        let mut cleaned: String = unsigned
            .chars()
            .filter(|ch| *ch != rules.grouping_separator)
            .collect();
        if rules.decimal_separator != '.' {
            cleaned = cleaned.replace(rules.decimal_separator, ".");
        }
        match cleaned.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(LedgerError::InvalidAmountFormat(text.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

fn insert_grouping(int_part: &mut String, separator: char) {
    if let Some(digits) = int_part.strip_prefix('-') {
        *int_part = format!("-{}", group_digits(digits, separator));
    } else {
        *int_part = group_digits(int_part, separator);
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}
