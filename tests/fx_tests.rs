// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use kitabu::errors::LedgerError;
use kitabu::fx::convert_to_lcy;
use kitabu::rates;
use kitabu::registry::{self, CurrencyRegistry, NewCurrency};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day(y: i32, m: u32, dd: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, dd).unwrap()
}

fn setup() -> Connection {
    let mut conn = kitabu::db::open_in_memory().unwrap();
    let mut reg = CurrencyRegistry::new();
    reg.create(
        &mut conn,
        &NewCurrency {
            code: "KES".into(),
            description: "Kenyan Shilling".into(),
            is_local: true,
        },
        "amina",
    )
    .unwrap();
    reg.create(
        &mut conn,
        &NewCurrency {
            code: "USD".into(),
            description: "US Dollar".into(),
            is_local: false,
        },
        "amina",
    )
    .unwrap();
    conn
}

#[test]
fn local_currency_converts_to_itself() {
    let conn = setup();
    let local = registry::local_currency(&conn).unwrap().unwrap();
    let amount = d("1234.567");
    let got = convert_to_lcy(&conn, amount, &local, day(2025, 8, 1)).unwrap();
    assert_eq!(got, amount);
}

#[test]
fn foreign_currency_multiplies_by_rate() {
    let conn = setup();
    rates::publish_rate(&conn, "USD", d("130.00"), "amina", day(2025, 8, 1)).unwrap();
    let usd = registry::get_currency(&conn, "USD").unwrap().unwrap();
    let got = convert_to_lcy(&conn, d("100.00"), &usd, day(2025, 8, 1)).unwrap();
    assert_eq!(got, d("13000.00"));
}

#[test]
fn missing_rate_is_a_currency_field_error() {
    let conn = setup();
    let usd = registry::get_currency(&conn, "USD").unwrap().unwrap();
    let err = convert_to_lcy(&conn, d("100.00"), &usd, day(2025, 8, 1)).unwrap_err();
    assert!(matches!(&err, LedgerError::MissingExchangeRate(code) if code == "USD"));
    assert_eq!(err.field(), Some("currency"));
}

#[test]
fn conversion_uses_most_recent_rate_on_or_before_the_date() {
    let conn = setup();
    rates::publish_rate(&conn, "USD", d("128.00"), "amina", day(2025, 7, 1)).unwrap();
    rates::publish_rate(&conn, "USD", d("130.00"), "amina", day(2025, 7, 15)).unwrap();

    assert_eq!(
        rates::rate_on_or_before(&conn, "USD", day(2025, 7, 1)).unwrap(),
        Some(d("128.00"))
    );
    assert_eq!(
        rates::rate_on_or_before(&conn, "USD", day(2025, 7, 10)).unwrap(),
        Some(d("128.00"))
    );
    assert_eq!(
        rates::rate_on_or_before(&conn, "USD", day(2025, 8, 1)).unwrap(),
        Some(d("130.00"))
    );
    assert_eq!(
        rates::rate_on_or_before(&conn, "USD", day(2025, 6, 30)).unwrap(),
        None
    );

    let usd = registry::get_currency(&conn, "USD").unwrap().unwrap();
    let got = convert_to_lcy(&conn, d("10.00"), &usd, day(2025, 7, 10)).unwrap();
    assert_eq!(got, d("1280.00"));
}
