// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::interest::loan_is_in_default;
use crate::utils::pretty_table;
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();

    // 1) Local currency sanity
    let locals: i64 = conn.query_row(
        "SELECT COUNT(*) FROM currencies WHERE is_local=1",
        [],
        |r| r.get(0),
    )?;
    let foreigns: i64 = conn.query_row(
        "SELECT COUNT(*) FROM currencies WHERE is_local=0",
        [],
        |r| r.get(0),
    )?;
    if locals == 0 && foreigns > 0 {
        rows.push(vec!["no_local_currency".into(), format!("{} foreign currencies", foreigns)]);
    }
    if locals > 1 {
        rows.push(vec!["multiple_local_currencies".into(), locals.to_string()]);
    }

    // 2) Foreign currencies with no published rate: their records cannot save
    let mut stmt = conn.prepare(
        "SELECT code FROM currencies WHERE is_local=0
         EXCEPT SELECT DISTINCT currency FROM exchange_rates",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let c: String = r.get(0)?;
        rows.push(vec!["missing_fx".into(), c]);
    }

    // 3) Records referencing unknown currencies
    for table in ["assets", "expenses", "income", "loans"] {
        let sql = format!(
            "SELECT DISTINCT currency FROM {} EXCEPT SELECT code FROM currencies",
            table
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut cur = stmt.query([])?;
        while let Some(r) = cur.next()? {
            let c: String = r.get(0)?;
            rows.push(vec!["unknown_currency".into(), format!("{} {}", table, c)]);
        }
    }

    // 4) Loans the next sweep would flag
    let today = Utc::now().date_naive();
    let mut stmt = conn.prepare(
        "SELECT id, due_balance, repayment_date FROM loans WHERE in_default=0",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let due_s: String = r.get(1)?;
        let date_s: String = r.get(2)?;
        let due = due_s.parse::<Decimal>().unwrap_or(Decimal::ZERO);
        if let Ok(date) = chrono::NaiveDate::parse_from_str(&date_s, "%Y-%m-%d") {
            if loan_is_in_default(due, date, today) {
                rows.push(vec!["unswept_default".into(), format!("loan {}", id)]);
            }
        }
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
