// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use kitabu::errors::LedgerError;
use kitabu::ledger;
use kitabu::rates;
use kitabu::records::{Family, FamilyEntry};
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
    for (code, local) in [("KES", true), ("USD", false)] {
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

fn expense(amount: &str, currency: &str) -> FamilyEntry {
    FamilyEntry::new(
        Family::Expense,
        "Rent".into(),
        "fixed".into(),
        currency.into(),
        d(amount),
        None,
        "amina".into(),
    )
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .unwrap()
}

#[test]
fn foreign_expense_derives_its_lcy_amount() {
    let mut conn = setup();
    rates::publish_rate(&conn, "USD", d("130.00"), "amina", day(2025, 8, 1)).unwrap();

    let mut record = expense("100.00", "USD");
    ledger::save_as_of(&mut conn, &mut record, day(2025, 8, 1)).unwrap();

    assert_eq!(record.entry.amount_lcy, d("13000.00"));
    let stored: String = conn
        .query_row(
            "SELECT amount_lcy FROM expenses WHERE id=?1",
            [record.entry.id.unwrap()],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(stored, "13000.00");
}

#[test]
fn local_amounts_save_unconverted() {
    let mut conn = setup();
    let mut record = expense("2500.50", "KES");
    ledger::save_as_of(&mut conn, &mut record, day(2025, 8, 1)).unwrap();
    assert_eq!(record.entry.amount_lcy, d("2500.50"));
}

#[test]
fn client_supplied_lcy_values_are_overwritten() {
    let mut conn = setup();
    rates::publish_rate(&conn, "USD", d("130.00"), "amina", day(2025, 8, 1)).unwrap();
    let mut record = expense("100.00", "USD");
    record.entry.amount_lcy = d("1.00");
    ledger::save_as_of(&mut conn, &mut record, day(2025, 8, 1)).unwrap();
    assert_eq!(record.entry.amount_lcy, d("13000.00"));
}

#[test]
fn failed_saves_write_nothing() {
    let mut conn = setup();
    // USD has no published rate, so the conversion step fails
    let mut record = expense("100.00", "USD");
    let err = ledger::save_as_of(&mut conn, &mut record, day(2025, 8, 1)).unwrap_err();
    assert!(matches!(&err, LedgerError::MissingExchangeRate(code) if code == "USD"));
    assert_eq!(count(&conn, "expenses"), 0);
}

#[test]
fn negative_amounts_are_rejected_before_commit() {
    let mut conn = setup();
    let mut record = expense("-10.00", "KES");
    let err = ledger::save_as_of(&mut conn, &mut record, day(2025, 8, 1)).unwrap_err();
    assert_eq!(err.field(), Some("amount"));
    assert_eq!(count(&conn, "expenses"), 0);
}

#[test]
fn unknown_kinds_are_rejected() {
    let mut conn = setup();
    let mut record = FamilyEntry::new(
        Family::Asset,
        "Plot".into(),
        "land".into(),
        "KES".into(),
        d("100"),
        None,
        "amina".into(),
    );
    let err = ledger::save_as_of(&mut conn, &mut record, day(2025, 8, 1)).unwrap_err();
    assert_eq!(err.field(), Some("kind"));
}

#[test]
fn unknown_currencies_are_rejected() {
    let mut conn = setup();
    let mut record = expense("10.00", "JPY");
    let err = ledger::save_as_of(&mut conn, &mut record, day(2025, 8, 1)).unwrap_err();
    assert_eq!(err.field(), Some("currency"));
    assert_eq!(count(&conn, "expenses"), 0);
}

#[test]
fn updates_require_a_modifier() {
    let mut conn = setup();
    let mut record = expense("100.00", "KES");
    ledger::save_as_of(&mut conn, &mut record, day(2025, 8, 1)).unwrap();
    let id = record.entry.id.unwrap();

    let mut loaded = FamilyEntry::load(&conn, Family::Expense, id).unwrap().unwrap();
    assert_eq!(loaded.entry.modified_by, None);
    let err = ledger::save_as_of(&mut conn, &mut loaded, day(2025, 8, 2)).unwrap_err();
    assert!(matches!(err, LedgerError::ModifierRequired));

    loaded.entry.modified_by = Some("bob".into());
    loaded.entry.amount = d("120.00");
    ledger::save_as_of(&mut conn, &mut loaded, day(2025, 8, 2)).unwrap();

    let (amount, modified_by): (String, Option<String>) = conn
        .query_row(
            "SELECT amount, modified_by FROM expenses WHERE id=?1",
            [id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(amount, "120.00");
    assert_eq!(modified_by.as_deref(), Some("bob"));
}

#[test]
fn creates_silently_clear_a_preset_modifier() {
    let mut conn = setup();
    let mut record = expense("100.00", "KES");
    record.entry.modified_by = Some("mallory".into());
    ledger::save_as_of(&mut conn, &mut record, day(2025, 8, 1)).unwrap();

    let modified_by: Option<String> = conn
        .query_row(
            "SELECT modified_by FROM expenses WHERE id=?1",
            [record.entry.id.unwrap()],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(modified_by, None);
}

#[test]
fn repeated_saves_do_not_drift() {
    let mut conn = setup();
    rates::publish_rate(&conn, "USD", d("130.37"), "amina", day(2025, 8, 1)).unwrap();
    let mut record = expense("33.33", "USD");
    ledger::save_as_of(&mut conn, &mut record, day(2025, 8, 1)).unwrap();
    let first = record.entry.amount_lcy;

    record.entry.modified_by = Some("amina".into());
    ledger::save_as_of(&mut conn, &mut record, day(2025, 8, 1)).unwrap();
    assert_eq!(record.entry.amount_lcy, first);
}

#[test]
fn end_to_end_usd_expense_against_ksh_local() {
    // KSH as the local currency, USD at 130.00 published today
    let mut conn = kitabu::db::open_in_memory().unwrap();
    let mut reg = CurrencyRegistry::new();
    reg.create(
        &mut conn,
        &NewCurrency {
            code: "KSH".into(),
            description: "Shilling".into(),
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
    let today = day(2025, 8, 7);
    rates::publish_rate(&conn, "USD", d("130.00"), "amina", today).unwrap();

    let mut record = expense("100.00", "USD");
    ledger::save_as_of(&mut conn, &mut record, today).unwrap();
    assert_eq!(record.entry.amount_lcy, d("13000.00"));
}
