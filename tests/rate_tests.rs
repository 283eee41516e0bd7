// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use kitabu::errors::LedgerError;
use kitabu::rates;
use kitabu::registry::{CurrencyRegistry, NewCurrency};
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
    for (code, local) in [("KES", true), ("USD", false), ("EUR", false)] {
        reg.create(
            &mut conn,
            &NewCurrency {
                code: code.into(),
                description: format!("{} test currency", code),
                is_local: local,
            },
            "amina",
        )
        .unwrap();
    }
    conn
}

#[test]
fn published_rates_are_quantized_half_up() {
    let conn = setup();
    let rate = rates::publish_rate(&conn, "USD", d("130.005"), "amina", day(2025, 8, 1)).unwrap();
    assert_eq!(rate.rate, d("130.01"));
    assert_eq!(rate.rate_date, day(2025, 8, 1));
    assert_eq!(rate.modified_by, None);
}

#[test]
fn rates_below_the_floor_are_rejected() {
    let conn = setup();
    let err = rates::publish_rate(&conn, "USD", d("0.05"), "amina", day(2025, 8, 1)).unwrap_err();
    assert_eq!(err.field(), Some("rate"));
}

#[test]
fn rates_cannot_target_the_local_currency() {
    let conn = setup();
    let err = rates::publish_rate(&conn, "KES", d("1.00"), "amina", day(2025, 8, 1)).unwrap_err();
    assert_eq!(err.field(), Some("currency"));
}

#[test]
fn one_rate_per_currency_per_day() {
    let conn = setup();
    rates::publish_rate(&conn, "USD", d("130.00"), "amina", day(2025, 8, 1)).unwrap();
    let err =
        rates::publish_rate(&conn, "USD", d("131.00"), "amina", day(2025, 8, 1)).unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateDailyRate));
    assert_eq!(err.field(), Some("currency"));

    // a different day or a different currency is fine
    rates::publish_rate(&conn, "USD", d("131.00"), "amina", day(2025, 8, 2)).unwrap();
    rates::publish_rate(&conn, "EUR", d("150.00"), "amina", day(2025, 8, 1)).unwrap();
}

#[test]
fn rate_updates_require_a_modifier() {
    let conn = setup();
    let rate = rates::publish_rate(&conn, "USD", d("130.00"), "amina", day(2025, 8, 1)).unwrap();

    let err = rates::update_rate(&conn, rate.id, d("131.00"), None).unwrap_err();
    assert!(matches!(err, LedgerError::ModifierRequired));

    rates::update_rate(&conn, rate.id, d("131.004"), Some("bob")).unwrap();
    let updated = rates::get_rate(&conn, rate.id).unwrap().unwrap();
    assert_eq!(updated.rate, d("131.00"));
    assert_eq!(updated.modified_by.as_deref(), Some("bob"));
}

#[test]
fn unknown_currencies_cannot_carry_rates() {
    let conn = setup();
    let err = rates::publish_rate(&conn, "JPY", d("1.10"), "amina", day(2025, 8, 1)).unwrap_err();
    assert_eq!(err.field(), Some("currency"));
}
