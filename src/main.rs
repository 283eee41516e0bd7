// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use kitabu::records::Family;
use kitabu::{cli, commands, db};

fn main() -> Result<()> {
    env_logger::init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("currency", sub)) => commands::currencies::handle(&mut conn, sub)?,
        Some(("rate", sub)) => commands::rates::handle(&mut conn, sub)?,
        Some(("interest-type", sub)) => commands::interest_types::handle(&conn, sub)?,
        Some(("asset", sub)) => commands::entries::handle(&mut conn, Family::Asset, sub)?,
        Some(("expense", sub)) => commands::entries::handle(&mut conn, Family::Expense, sub)?,
        Some(("income", sub)) => commands::entries::handle(&mut conn, Family::Income, sub)?,
        Some(("loan", sub)) => commands::loans::handle(&mut conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
