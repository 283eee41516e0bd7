// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::registry;
use crate::utils::{field_error, maybe_print_json, pretty_table, require_user};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let user = require_user(sub)?;
            let code = sub.get_one::<String>("code").unwrap();
            let description = sub.get_one::<String>("description").unwrap();
            registry::create_interest_type(conn, code, description, &user)
                .map_err(field_error)?;
            println!("Added interest type {}", code.to_uppercase());
        }
        Some(("update", sub)) => {
            let user = require_user(sub)?;
            let code = sub.get_one::<String>("code").unwrap();
            let description = sub.get_one::<String>("description").unwrap();
            registry::update_interest_type(conn, code, description, Some(user.as_str()))
                .map_err(field_error)?;
            println!("Updated interest type {}", code.to_uppercase());
        }
        Some(("rm", sub)) => {
            let code = sub.get_one::<String>("code").unwrap();
            registry::delete_interest_type(conn, code).map_err(field_error)?;
            println!("Removed interest type {}", code.to_uppercase());
        }
        Some(("list", sub)) => {
            let data = registry::list_interest_types(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|t| {
                        vec![
                            t.code,
                            t.description,
                            t.created_by,
                            t.modified_by.unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Code", "Description", "Created by", "Modified by"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}
