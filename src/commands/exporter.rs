// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("assets", sub)) => export_entries(conn, "assets", sub),
        Some(("expenses", sub)) => export_entries(conn, "expenses", sub),
        Some(("income", sub)) => export_entries(conn, "income", sub),
        Some(("loans", sub)) => export_loans(conn, sub),
        _ => Ok(()),
    }
}

const ENTRY_COLUMNS: &[&str] = &[
    "id",
    "name",
    "kind",
    "amount",
    "currency",
    "amount_lcy",
    "notes",
    "created_by",
    "created_at",
];

const LOAN_COLUMNS: &[&str] = &[
    "id",
    "source",
    "reason",
    "loan_date",
    "repayment_date",
    "amount_taken",
    "currency",
    "interest_type",
    "interest",
    "amount_repay",
    "amount_paid",
    "due_balance",
    "in_default",
    "created_by",
    "created_at",
];

fn export_entries(conn: &Connection, table: &str, sub: &clap::ArgMatches) -> Result<()> {
    let sql = format!(
        "SELECT id, name, kind, amount, currency, amount_lcy, notes, created_by, created_at
         FROM {} ORDER BY id",
        table
    );
    let rows = query_rows(conn, &sql, ENTRY_COLUMNS.len())?;
    write_rows(sub, ENTRY_COLUMNS, rows, table)
}

fn export_loans(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let sql = "SELECT id, source, reason, loan_date, repayment_date, amount_taken, currency,
                      interest_type, interest, amount_repay, amount_paid, due_balance, in_default,
                      created_by, created_at
               FROM loans ORDER BY id";
    let rows = query_rows(conn, sql, LOAN_COLUMNS.len())?;
    write_rows(sub, LOAN_COLUMNS, rows, "loans")
}

fn query_rows(conn: &Connection, sql: &str, width: usize) -> Result<Vec<Vec<String>>> {
    let mut stmt = conn.prepare(sql)?;
    let mut cur = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = cur.next()? {
        let mut row = Vec::with_capacity(width);
        for i in 0..width {
            let v: Option<rusqlite::types::Value> = r.get(i)?;
            row.push(match v {
                Some(rusqlite::types::Value::Text(s)) => s,
                Some(rusqlite::types::Value::Integer(n)) => n.to_string(),
                Some(rusqlite::types::Value::Real(f)) => f.to_string(),
                _ => String::new(),
            });
        }
        out.push(row);
    }
    Ok(out)
}

fn write_rows(
    sub: &clap::ArgMatches,
    columns: &[&str],
    rows: Vec<Vec<String>>,
    what: &str,
) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(columns)?;
            for row in rows {
                wtr.write_record(&row)?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<serde_json::Value> = rows
                .into_iter()
                .map(|row| {
                    let mut obj = serde_json::Map::new();
                    for (col, value) in columns.iter().zip(row) {
                        obj.insert((*col).to_string(), json!(value));
                    }
                    serde_json::Value::Object(obj)
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
            return Ok(());
        }
    }
    println!("Exported {} to {}", what, out);
    Ok(())
}
