// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::records::{list_entries, Family, FamilyEntry};
use crate::utils::{
    field_error, fmt_money, maybe_print_json, parse_decimal, pretty_table, require_user,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, family: Family, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, family, sub)?,
        Some(("update", sub)) => update(conn, family, sub)?,
        Some(("list", sub)) => list(conn, family, sub)?,
        Some(("rm", sub)) => {
            let user = require_user(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            FamilyEntry::delete(conn, family, id, &user).map_err(field_error)?;
            println!("Removed {} {}", family.entity(), id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, family: Family, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(sub)?;
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let kind = sub.get_one::<String>("kind").unwrap().clone();
    let currency = sub.get_one::<String>("currency").unwrap().clone();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let notes = sub.get_one::<String>("notes").cloned();

    let mut record = FamilyEntry::new(family, name, kind, currency, amount, notes, user);
    ledger::save(conn, &mut record).map_err(field_error)?;
    let e = &record.entry;
    println!(
        "Recorded {} '{}' for {} (LCY {})",
        family.entity(),
        e.name,
        fmt_money(&e.amount, &e.currency),
        e.amount_lcy
    );
    Ok(())
}

fn update(conn: &mut Connection, family: Family, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut record = FamilyEntry::load(conn, family, id)?
        .ok_or_else(|| anyhow::anyhow!("{} {} not found", family.entity(), id))?;
    if record.entry.created_by != user {
        anyhow::bail!("{} {} not found for user {}", family.entity(), id, user);
    }

    if let Some(name) = sub.get_one::<String>("name") {
        record.entry.name = name.trim().to_string();
    }
    if let Some(kind) = sub.get_one::<String>("kind") {
        record.entry.kind = kind.clone();
    }
    if let Some(currency) = sub.get_one::<String>("currency") {
        record.entry.currency = currency.trim().to_uppercase();
    }
    if let Some(amount) = sub.get_one::<String>("amount") {
        record.entry.amount = parse_decimal(amount)?;
    }
    if let Some(notes) = sub.get_one::<String>("notes") {
        record.entry.notes = Some(notes.clone());
    }
    record.entry.modified_by = Some(user);

    ledger::save(conn, &mut record).map_err(field_error)?;
    println!(
        "Updated {} {} (LCY {})",
        family.entity(),
        id,
        record.entry.amount_lcy
    );
    Ok(())
}

fn list(conn: &Connection, family: Family, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").map(|s| s.as_str());
    let data = list_entries(conn, family, user)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.name,
                    r.kind,
                    r.amount,
                    r.currency,
                    r.amount_lcy,
                    r.created_by,
                    r.notes,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Name", "Kind", "Amount", "CCY", "Amount LCY", "Owner", "Notes"],
                rows,
            )
        );
    }
    Ok(())
}
