// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use kitabu::commands::exporter;
use kitabu::ledger;
use kitabu::records::{Family, FamilyEntry};
use kitabu::registry::{CurrencyRegistry, NewCurrency};
use kitabu::{cli, rates};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

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
    let today = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
    rates::publish_rate(&conn, "USD", Decimal::from_str("130.00").unwrap(), "amina", today)
        .unwrap();

    let mut record = FamilyEntry::new(
        Family::Expense,
        "Rent".into(),
        "fixed".into(),
        "USD".into(),
        Decimal::from_str("100.00").unwrap(),
        Some("August".into()),
        "amina".into(),
    );
    ledger::save_as_of(&mut conn, &mut record, today).unwrap();
    conn
}

#[test]
fn expenses_export_as_csv() {
    let conn = setup();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("expenses.csv");

    let matches = cli::build_cli().get_matches_from([
        "kitabu",
        "export",
        "expenses",
        "--out",
        out.to_str().unwrap(),
    ]);
    let Some(("export", export_m)) = matches.subcommand() else {
        panic!("no export subcommand");
    };
    exporter::handle(&conn, export_m).unwrap();

    let body = std::fs::read_to_string(&out).unwrap();
    let mut lines = body.lines();
    assert_eq!(
        lines.next().unwrap(),
        "id,name,kind,amount,currency,amount_lcy,notes,created_by,created_at"
    );
    let row = lines.next().unwrap();
    assert!(row.contains("Rent"));
    assert!(row.contains("13000.00"));
}

#[test]
fn loans_export_as_json() {
    let conn = setup();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("loans.json");

    let matches = cli::build_cli().get_matches_from([
        "kitabu",
        "export",
        "loans",
        "--format",
        "json",
        "--out",
        out.to_str().unwrap(),
    ]);
    let Some(("export", export_m)) = matches.subcommand() else {
        panic!("no export subcommand");
    };
    exporter::handle(&conn, export_m).unwrap();

    let body = std::fs::read_to_string(&out).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(parsed.as_array().unwrap().is_empty());
}
