// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::builder::PossibleValuesParser;
use clap::{crate_version, value_parser, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("kitabu")
        .about("Multi-currency personal finance ledger")
        .version(crate_version!())
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .value_name("NAME")
                .help("Acting user, recorded as creator on adds and as modifier on updates"),
        )
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(currency_cmd())
        .subcommand(rate_cmd())
        .subcommand(interest_type_cmd())
        .subcommand(entry_cmd(
            "asset",
            "Track financial assets",
            &["liquid", "equity", "investment", "retirement"],
        ))
        .subcommand(entry_cmd(
            "expense",
            "Track expenses",
            &["fixed", "variable", "discretionary"],
        ))
        .subcommand(entry_cmd(
            "income",
            "Track income",
            &["earned", "portfolio", "passive"],
        ))
        .subcommand(loan_cmd())
        .subcommand(export_cmd())
        .subcommand(Command::new("doctor").about("Run read-only integrity checks"))
}

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn currency_cmd() -> Command {
    Command::new("currency")
        .about("Manage the currency registry")
        .subcommand(
            Command::new("add")
                .about("Register a currency")
                .arg(Arg::new("code").long("code").required(true).value_name("CCY"))
                .arg(
                    Arg::new("description")
                        .long("description")
                        .required(true)
                        .value_name("TEXT"),
                )
                .arg(
                    Arg::new("local")
                        .long("local")
                        .action(ArgAction::SetTrue)
                        .help("Mark as the single local currency"),
                ),
        )
        .subcommand(
            Command::new("update")
                .about("Update a currency (requires --user as modifier)")
                .arg(Arg::new("code").long("code").required(true).value_name("CCY"))
                .arg(Arg::new("description").long("description").value_name("TEXT"))
                .arg(
                    Arg::new("is-local")
                        .long("is-local")
                        .value_name("BOOL")
                        .value_parser(value_parser!(bool)),
                ),
        )
        .subcommand(json_flags(Command::new("list").about("List currencies")))
        .subcommand(Command::new("local").about("Show the local currency"))
        .subcommand(
            Command::new("fetch")
                .about("Seed currency descriptions from openexchangerates"),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a currency")
                .arg(Arg::new("code").long("code").required(true).value_name("CCY")),
        )
}

fn rate_cmd() -> Command {
    Command::new("rate")
        .about("Manage daily exchange rates against the local currency")
        .subcommand(
            Command::new("add")
                .about("Publish today's rate for a foreign currency")
                .arg(Arg::new("currency").long("currency").required(true).value_name("CCY"))
                .arg(Arg::new("rate").long("rate").required(true).value_name("DECIMAL")),
        )
        .subcommand(
            Command::new("set")
                .about("Correct a published rate (requires --user as modifier)")
                .arg(
                    Arg::new("id")
                        .long("id")
                        .required(true)
                        .value_name("ID")
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("rate").long("rate").required(true).value_name("DECIMAL")),
        )
        .subcommand(json_flags(
            Command::new("list").about("List published rates").arg(
                Arg::new("limit")
                    .long("limit")
                    .value_name("N")
                    .value_parser(value_parser!(usize)),
            ),
        ))
        .subcommand(
            Command::new("rm").about("Delete a published rate").arg(
                Arg::new("id")
                    .long("id")
                    .required(true)
                    .value_name("ID")
                    .value_parser(value_parser!(i64)),
            ),
        )
}

fn interest_type_cmd() -> Command {
    Command::new("interest-type")
        .about("Manage interest types (e.g. SIMPLE, COMPOUND)")
        .subcommand(
            Command::new("add")
                .about("Register an interest type")
                .arg(Arg::new("code").long("code").required(true).value_name("CODE"))
                .arg(
                    Arg::new("description")
                        .long("description")
                        .required(true)
                        .value_name("TEXT"),
                ),
        )
        .subcommand(
            Command::new("update")
                .about("Update an interest type (requires --user as modifier)")
                .arg(Arg::new("code").long("code").required(true).value_name("CODE"))
                .arg(
                    Arg::new("description")
                        .long("description")
                        .required(true)
                        .value_name("TEXT"),
                ),
        )
        .subcommand(json_flags(Command::new("list").about("List interest types")))
        .subcommand(
            Command::new("rm")
                .about("Delete an interest type")
                .arg(Arg::new("code").long("code").required(true).value_name("CODE")),
        )
}

fn entry_cmd(name: &'static str, about: &'static str, kinds: &[&'static str]) -> Command {
    let kinds: Vec<&'static str> = kinds.to_vec();
    Command::new(name)
        .about(about)
        .subcommand(
            Command::new("add")
                .about("Record a new entry")
                .arg(Arg::new("name").long("name").required(true).value_name("TEXT"))
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .required(true)
                        .value_name("KIND")
                        .value_parser(PossibleValuesParser::new(kinds.clone())),
                )
                .arg(Arg::new("currency").long("currency").required(true).value_name("CCY"))
                .arg(Arg::new("amount").long("amount").required(true).value_name("DECIMAL"))
                .arg(Arg::new("notes").long("notes").value_name("TEXT")),
        )
        .subcommand(
            Command::new("update")
                .about("Update an entry (requires --user as modifier)")
                .arg(
                    Arg::new("id")
                        .long("id")
                        .required(true)
                        .value_name("ID")
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("name").long("name").value_name("TEXT"))
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .value_name("KIND")
                        .value_parser(PossibleValuesParser::new(kinds)),
                )
                .arg(Arg::new("currency").long("currency").value_name("CCY"))
                .arg(Arg::new("amount").long("amount").value_name("DECIMAL"))
                .arg(Arg::new("notes").long("notes").value_name("TEXT")),
        )
        .subcommand(json_flags(Command::new("list").about("List entries")))
        .subcommand(
            Command::new("rm").about("Delete an entry").arg(
                Arg::new("id")
                    .long("id")
                    .required(true)
                    .value_name("ID")
                    .value_parser(value_parser!(i64)),
            ),
        )
}

fn loan_cmd() -> Command {
    Command::new("loan")
        .about("Track loans with interest accrual")
        .subcommand(
            Command::new("add")
                .about("Record a new loan")
                .arg(Arg::new("source").long("source").required(true).value_name("TEXT"))
                .arg(Arg::new("reason").long("reason").required(true).value_name("TEXT"))
                .arg(Arg::new("loan-date").long("loan-date").required(true).value_name("DATE"))
                .arg(
                    Arg::new("repayment-date")
                        .long("repayment-date")
                        .required(true)
                        .value_name("DATE"),
                )
                .arg(Arg::new("currency").long("currency").required(true).value_name("CCY"))
                .arg(Arg::new("amount").long("amount").required(true).value_name("DECIMAL"))
                .arg(
                    Arg::new("interest-type")
                        .long("interest-type")
                        .required(true)
                        .value_name("CODE"),
                )
                .arg(
                    Arg::new("interest-rate")
                        .long("interest-rate")
                        .required(true)
                        .value_name("PERCENT"),
                )
                .arg(
                    Arg::new("compound-frequency")
                        .long("compound-frequency")
                        .value_name("N")
                        .value_parser(value_parser!(u32))
                        .help("Compounding periods per year, required for COMPOUND loans"),
                )
                .arg(Arg::new("amount-paid").long("amount-paid").value_name("DECIMAL"))
                .arg(Arg::new("due-balance").long("due-balance").value_name("DECIMAL")),
        )
        .subcommand(
            Command::new("update")
                .about("Update a loan (requires --user as modifier)")
                .arg(
                    Arg::new("id")
                        .long("id")
                        .required(true)
                        .value_name("ID")
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("source").long("source").value_name("TEXT"))
                .arg(Arg::new("reason").long("reason").value_name("TEXT"))
                .arg(Arg::new("loan-date").long("loan-date").value_name("DATE"))
                .arg(Arg::new("repayment-date").long("repayment-date").value_name("DATE"))
                .arg(Arg::new("currency").long("currency").value_name("CCY"))
                .arg(Arg::new("amount").long("amount").value_name("DECIMAL"))
                .arg(Arg::new("interest-type").long("interest-type").value_name("CODE"))
                .arg(
                    Arg::new("interest-rate")
                        .long("interest-rate")
                        .value_name("PERCENT"),
                )
                .arg(
                    Arg::new("compound-frequency")
                        .long("compound-frequency")
                        .value_name("N")
                        .value_parser(value_parser!(u32)),
                )
                .arg(Arg::new("amount-paid").long("amount-paid").value_name("DECIMAL"))
                .arg(Arg::new("due-balance").long("due-balance").value_name("DECIMAL")),
        )
        .subcommand(json_flags(Command::new("list").about("List loans")))
        .subcommand(
            Command::new("rm").about("Delete a loan").arg(
                Arg::new("id")
                    .long("id")
                    .required(true)
                    .value_name("ID")
                    .value_parser(value_parser!(i64)),
            ),
        )
        .subcommand(
            Command::new("sweep-defaults")
                .about("Flag loans past repayment with a balance still owing"),
        )
}

fn export_cmd() -> Command {
    let entity = |name: &'static str| {
        Command::new(name)
            .arg(
                Arg::new("format")
                    .long("format")
                    .value_name("FORMAT")
                    .default_value("csv")
                    .value_parser(PossibleValuesParser::new(["csv", "json"])),
            )
            .arg(Arg::new("out").long("out").required(true).value_name("FILE"))
    };
    Command::new("export")
        .about("Export records to CSV or JSON")
        .subcommand(entity("assets"))
        .subcommand(entity("expenses"))
        .subcommand(entity("income"))
        .subcommand(entity("loans"))
}
