mod common;

use common::fixture;
use ledger_core::{currency::Currency, LedgerError};

#[test]
fn money_strings_round_trip_for_every_currency() {
    for currency in Currency::ALL {
        for amount in [0.0, 0.01, -0.01, 1.5, -2.1, 999.99, 1000.0, -12345.67, 9876543.21] {
            let text = currency.format(amount, 0);
            assert!(!text.contains("-0.00") && !text.contains("-0,00"), "{text}");
            assert_eq!(currency.parse(&text).unwrap(), amount, "{currency}: {text}");
        }
    }
}

#[test]
fn justified_strings_still_parse() {
    let text = Currency::Gbp.format(-1234.5, 14);
    assert_eq!(text, "    £-1,234.50");
    assert_eq!(Currency::Gbp.parse(&text).unwrap(), -1234.5);
}

#[test]
fn parse_rejects_text_from_another_currency() {
    let err = Currency::Usd.parse("€12,00").expect_err("foreign symbol");
    assert!(matches!(err, LedgerError::InvalidAmountFormat(ref input) if input == "€12,00"));
}

#[test]
fn accounts_format_with_their_own_currency() {
    let fx = fixture();
    let checking = fx.bank.create_account("Checking").unwrap();
    let euros = fx.bank.create_account("Euros").unwrap();
    euros.set_currency(Currency::Eur);
    assert_eq!(checking.format_amount(-0.001, 0), "$0.00");
    assert_eq!(euros.format_amount(1234.5, 0), "€1 234,50");
    assert_eq!(fx.bank.format_amount(1234.5, 10), " $1,234.50");
}
