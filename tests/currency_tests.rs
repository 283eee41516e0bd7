// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use kitabu::errors::{translate_constraint, LedgerError};
use kitabu::registry::{self, CurrencyRegistry, NewCurrency};
use rusqlite::Connection;

fn new_currency(code: &str, is_local: bool) -> NewCurrency {
    NewCurrency {
        code: code.into(),
        description: format!("{} test currency", code),
        is_local,
    }
}

fn setup() -> (Connection, CurrencyRegistry) {
    let conn = kitabu::db::open_in_memory().unwrap();
    (conn, CurrencyRegistry::new())
}

#[test]
fn only_one_local_currency_can_exist() {
    let (mut conn, mut reg) = setup();
    reg.create(&mut conn, &new_currency("KES", true), "amina").unwrap();
    let err = reg
        .create(&mut conn, &new_currency("USD", true), "amina")
        .unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateLocalCurrency));
    assert_eq!(err.field(), Some("is_local"));
}

#[test]
fn storage_constraint_backstops_the_local_invariant() {
    let (mut conn, mut reg) = setup();
    reg.create(&mut conn, &new_currency("KES", true), "amina").unwrap();
    // bypass the registry the way a racing writer would
    let err = conn
        .execute(
            "INSERT INTO currencies(code, description, is_local, created_by)
             VALUES ('USD', 'US Dollar', 1, 'amina')",
            [],
        )
        .unwrap_err();
    assert!(matches!(
        translate_constraint(err),
        LedgerError::DuplicateLocalCurrency
    ));
}

#[test]
fn foreign_currency_requires_a_local_one_first() {
    let (mut conn, mut reg) = setup();
    let err = reg
        .create(&mut conn, &new_currency("USD", false), "amina")
        .unwrap_err();
    assert_eq!(err.field(), Some("is_local"));

    reg.create(&mut conn, &new_currency("KES", true), "amina").unwrap();
    reg.create(&mut conn, &new_currency("USD", false), "amina").unwrap();
}

#[test]
fn currency_codes_are_three_uppercase_letters() {
    let (mut conn, mut reg) = setup();
    // lowercase input is normalized, not rejected
    reg.create(&mut conn, &new_currency("kes", true), "amina").unwrap();
    assert!(registry::currency_exists(&conn, "KES").unwrap());

    for bad in ["KE", "KSHX", "K3S", ""] {
        let err = reg
            .create(&mut conn, &new_currency(bad, false), "amina")
            .unwrap_err();
        assert_eq!(err.field(), Some("code"), "expected code error for '{}'", bad);
    }
}

#[test]
fn currency_updates_require_a_modifier() {
    let (mut conn, mut reg) = setup();
    reg.create(&mut conn, &new_currency("KES", true), "amina").unwrap();

    let err = reg
        .update(&mut conn, "KES", Some("Shilling"), None, None)
        .unwrap_err();
    assert!(matches!(err, LedgerError::ModifierRequired));
    assert_eq!(err.field(), Some("modified_by"));

    reg.update(&mut conn, "KES", Some("Shilling"), None, Some("bob"))
        .unwrap();
    let kes = registry::get_currency(&conn, "KES").unwrap().unwrap();
    assert_eq!(kes.description, "Shilling");
    assert_eq!(kes.modified_by.as_deref(), Some("bob"));
}

#[test]
fn creates_never_carry_a_modifier() {
    let (mut conn, mut reg) = setup();
    reg.create(&mut conn, &new_currency("KES", true), "amina").unwrap();
    let kes = registry::get_currency(&conn, "KES").unwrap().unwrap();
    assert_eq!(kes.created_by, "amina");
    assert_eq!(kes.modified_by, None);
}

#[test]
fn demoting_the_sole_local_currency_is_rejected() {
    let (mut conn, mut reg) = setup();
    reg.create(&mut conn, &new_currency("KES", true), "amina").unwrap();
    reg.create(&mut conn, &new_currency("USD", false), "amina").unwrap();
    let err = reg
        .update(&mut conn, "KES", None, Some(false), Some("amina"))
        .unwrap_err();
    assert_eq!(err.field(), Some("is_local"));
}

#[test]
fn local_currency_cannot_be_deleted_while_foreigns_exist() {
    let (mut conn, mut reg) = setup();
    reg.create(&mut conn, &new_currency("KES", true), "amina").unwrap();
    reg.create(&mut conn, &new_currency("USD", false), "amina").unwrap();

    let err = reg.delete(&conn, "KES").unwrap_err();
    assert_eq!(err.field(), Some("is_local"));

    reg.delete(&conn, "USD").unwrap();
    reg.delete(&conn, "KES").unwrap();
    assert!(registry::local_currency(&conn).unwrap().is_none());
}

#[test]
fn referenced_currencies_cannot_be_deleted() {
    let (mut conn, mut reg) = setup();
    reg.create(&mut conn, &new_currency("KES", true), "amina").unwrap();
    conn.execute(
        "INSERT INTO assets(name, kind, currency, amount, created_by)
         VALUES ('Cash', 'liquid', 'KES', '10.00', 'amina')",
        [],
    )
    .unwrap();
    let err = reg.delete(&conn, "KES").unwrap_err();
    assert_eq!(err.field(), Some("code"));
}

#[test]
fn local_display_cache_is_invalidated_by_writes() {
    let (mut conn, mut reg) = setup();
    reg.create(&mut conn, &new_currency("KES", true), "amina").unwrap();

    let first = reg.local_display(&conn).unwrap().unwrap();
    assert_eq!(first.description, "KES test currency");

    reg.update(&mut conn, "KES", Some("Kenyan Shilling"), None, Some("bob"))
        .unwrap();
    let second = reg.local_display(&conn).unwrap().unwrap();
    assert_eq!(second.description, "Kenyan Shilling");
}
