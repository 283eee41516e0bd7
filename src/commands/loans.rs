// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::models::Loan;
use crate::records::{self, list_loans};
use crate::utils::{
    field_error, fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table,
    require_user,
};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let user = require_user(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            Loan::delete(conn, id, &user).map_err(field_error)?;
            println!("Removed loan {}", id);
        }
        Some(("sweep-defaults", _)) => {
            let flagged = records::sweep_defaults(conn, Utc::now().date_naive())?;
            println!("Loan default check completed. Updated {} loans.", flagged);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(sub)?;
    let amount_paid = match sub.get_one::<String>("amount-paid") {
        Some(raw) => parse_decimal(raw)?,
        None => Decimal::ZERO,
    };
    let due_balance = match sub.get_one::<String>("due-balance") {
        Some(raw) => parse_decimal(raw)?,
        None => Decimal::ZERO,
    };
    let mut loan = Loan::new(
        sub.get_one::<String>("source").unwrap().trim().to_string(),
        sub.get_one::<String>("reason").unwrap().trim().to_string(),
        parse_date(sub.get_one::<String>("loan-date").unwrap())?,
        parse_date(sub.get_one::<String>("repayment-date").unwrap())?,
        sub.get_one::<String>("currency").unwrap().clone(),
        parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        sub.get_one::<String>("interest-type").unwrap().clone(),
        sub.get_one::<u32>("compound-frequency").copied(),
        parse_decimal(sub.get_one::<String>("interest-rate").unwrap())?,
        amount_paid,
        due_balance,
        user,
    );
    ledger::save(conn, &mut loan).map_err(field_error)?;
    println!(
        "Recorded loan from '{}' of {}: interest {}, repay {} (LCY {})",
        loan.source,
        fmt_money(&loan.amount_taken, &loan.currency),
        loan.interest,
        loan.amount_repay,
        loan.amount_repay_lcy
    );
    Ok(())
}

fn update(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut loan =
        Loan::load(conn, id)?.ok_or_else(|| anyhow::anyhow!("loan {} not found", id))?;
    if loan.created_by != user {
        anyhow::bail!("loan {} not found for user {}", id, user);
    }

    if let Some(source) = sub.get_one::<String>("source") {
        loan.source = source.trim().to_string();
    }
    if let Some(reason) = sub.get_one::<String>("reason") {
        loan.reason = reason.trim().to_string();
    }
    if let Some(raw) = sub.get_one::<String>("loan-date") {
        loan.loan_date = parse_date(raw)?;
    }
    if let Some(raw) = sub.get_one::<String>("repayment-date") {
        loan.repayment_date = parse_date(raw)?;
    }
    if let Some(currency) = sub.get_one::<String>("currency") {
        loan.currency = currency.trim().to_uppercase();
    }
    if let Some(raw) = sub.get_one::<String>("amount") {
        loan.amount_taken = parse_decimal(raw)?;
    }
    if let Some(code) = sub.get_one::<String>("interest-type") {
        loan.interest_type = code.trim().to_uppercase();
    }
    if let Some(n) = sub.get_one::<u32>("compound-frequency") {
        loan.compound_frequency = Some(*n);
    }
    if let Some(raw) = sub.get_one::<String>("interest-rate") {
        loan.interest_rate = parse_decimal(raw)?;
    }
    if let Some(raw) = sub.get_one::<String>("amount-paid") {
        loan.amount_paid = parse_decimal(raw)?;
    }
    if let Some(raw) = sub.get_one::<String>("due-balance") {
        loan.due_balance = parse_decimal(raw)?;
    }
    loan.modified_by = Some(user);

    ledger::save(conn, &mut loan).map_err(field_error)?;
    println!(
        "Updated loan {}: interest {}, repay {}, due {}",
        id, loan.interest, loan.amount_repay, loan.due_balance
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").map(|s| s.as_str());
    let data = list_loans(conn, user)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.source,
                    r.loan_date,
                    r.repayment_date,
                    r.amount_taken,
                    r.currency,
                    r.interest_type,
                    r.interest,
                    r.amount_repay,
                    r.due_balance,
                    if r.in_default { "yes".into() } else { "no".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Id", "Source", "Taken", "Due date", "Amount", "CCY", "Type", "Interest",
                    "Repay", "Balance", "Default",
                ],
                rows,
            )
        );
    }
    Ok(())
}
