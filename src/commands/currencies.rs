// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::registry::{self, CurrencyRegistry, NewCurrency};
use crate::utils::{field_error, http_client, maybe_print_json, pretty_table, require_user};
use anyhow::Result;
use rusqlite::Connection;
use std::collections::BTreeMap;

const CURRENCY_API_URL: &str = "https://openexchangerates.org/api/currencies.json";

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    let mut reg = CurrencyRegistry::new();
    match m.subcommand() {
        Some(("add", sub)) => {
            let user = require_user(sub)?;
            let new = NewCurrency {
                code: sub.get_one::<String>("code").unwrap().clone(),
                description: sub.get_one::<String>("description").unwrap().clone(),
                is_local: sub.get_flag("local"),
            };
            reg.create(conn, &new, &user).map_err(field_error)?;
            println!(
                "Added {} currency {}",
                if new.is_local { "local" } else { "foreign" },
                new.code.trim().to_uppercase()
            );
        }
        Some(("update", sub)) => {
            let user = require_user(sub)?;
            let code = sub.get_one::<String>("code").unwrap();
            let description = sub.get_one::<String>("description").map(|s| s.as_str());
            let is_local = sub.get_one::<bool>("is-local").copied();
            reg.update(conn, code, description, is_local, Some(user.as_str()))
                .map_err(field_error)?;
            println!("Updated currency {}", code.to_uppercase());
        }
        Some(("list", sub)) => {
            let user = sub.get_one::<String>("user").map(|s| s.as_str());
            let data = registry::list_currencies(conn, user)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|c| {
                        vec![
                            c.code,
                            c.description,
                            if c.is_local { "local".into() } else { "foreign".into() },
                            c.created_by,
                            c.created_at,
                            c.modified_by.unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Code", "Description", "Scope", "Created by", "Created", "Modified by"],
                        rows,
                    )
                );
            }
        }
        Some(("local", _)) => match reg.local_display(conn)? {
            Some(c) => println!("Local currency: {} - {}", c.code, c.description),
            None => println!("No local currency configured"),
        },
        Some(("fetch", sub)) => fetch(conn, &mut reg, sub)?,
        Some(("rm", sub)) => {
            let code = sub.get_one::<String>("code").unwrap();
            reg.delete(conn, code).map_err(field_error)?;
            println!("Removed currency {}", code.to_uppercase());
        }
        _ => {}
    }
    Ok(())
}

fn fetch(conn: &mut Connection, reg: &mut CurrencyRegistry, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(sub)?;
    if registry::local_currency(conn)?.is_none() {
        anyhow::bail!("no local currency configured; add one with `currency add --local` first");
    }

    let client = http_client()?;
    let resp = client.get(CURRENCY_API_URL).send()?.error_for_status()?;
    let data: BTreeMap<String, String> = resp.json()?;

    let (mut created, mut updated, mut skipped) = (0usize, 0usize, 0usize);
    for (code, description) in data {
        if registry::currency_exists(conn, &code)? {
            match reg.update(conn, &code, Some(description.as_str()), None, Some(user.as_str())) {
                Ok(()) => updated += 1,
                Err(_) => skipped += 1,
            }
        } else {
            let new = NewCurrency {
                code,
                description,
                is_local: false,
            };
            match reg.create(conn, &new, &user) {
                Ok(()) => created += 1,
                Err(_) => skipped += 1,
            }
        }
    }
    println!(
        "Currency sync complete: {} added, {} updated, {} skipped.",
        created, updated, skipped
    );
    Ok(())
}
