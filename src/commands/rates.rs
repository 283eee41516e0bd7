// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::rates;
use crate::registry::CurrencyRegistry;
use crate::utils::{field_error, maybe_print_json, parse_decimal, pretty_table, require_user};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let user = require_user(sub)?;
            let code = sub.get_one::<String>("currency").unwrap();
            let rate = parse_decimal(sub.get_one::<String>("rate").unwrap())?;
            let today = Utc::now().date_naive();
            let published =
                rates::publish_rate(conn, code, rate, &user, today).map_err(field_error)?;
            println!(
                "Published rate {} for {} on {}",
                published.rate, published.currency, published.rate_date
            );
        }
        Some(("set", sub)) => {
            let user = require_user(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            let rate = parse_decimal(sub.get_one::<String>("rate").unwrap())?;
            rates::update_rate(conn, id, rate, Some(user.as_str())).map_err(field_error)?;
            println!("Updated exchange rate {}", id);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            rates::delete_rate(conn, id).map_err(field_error)?;
            println!("Removed exchange rate {}", id);
        }
        Some(("list", sub)) => {
            let user = sub.get_one::<String>("user").map(|s| s.as_str());
            let limit = sub.get_one::<usize>("limit").copied().unwrap_or(50);
            let data = rates::list_rates(conn, user, limit)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let mut reg = CurrencyRegistry::new();
                if let Some(local) = reg.local_display(conn)? {
                    println!("Rates against local currency {}", local.code);
                }
                let rows = data
                    .into_iter()
                    .map(|r| {
                        vec![
                            r.id.to_string(),
                            r.currency,
                            r.rate.to_string(),
                            r.rate_date.to_string(),
                            r.created_by,
                            r.modified_by.unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Id", "Currency", "Rate", "Date", "Created by", "Modified by"],
                        rows,
                    )
                );
            }
        }
        _ => {}
    }
    Ok(())
}
