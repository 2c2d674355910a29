// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

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
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .help("Month as YYYY-MM (defaults to the current month)")
}

fn date_arg() -> Arg {
    Arg::new("date")
        .long("date")
        .help("Date as YYYY-MM-DD (defaults to today)")
}

fn category_pos() -> Arg {
    Arg::new("category")
        .required(true)
        .help("Category id or name")
}

pub fn build_cli() -> Command {
    Command::new("pennywise")
        .about("Personal ledger: balances, budgets, recurring bills and paychecks")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("Path to the SQLite database (overrides PENNYWISE_DB)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(Command::new("init").about("Create the database and seed defaults"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("checking")
                                .value_parser(["checking", "savings"]),
                        )
                        .arg(Arg::new("balance").long("balance").default_value("0"))
                        .arg(Arg::new("start").long("start").help("Starting date")),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(
                        Arg::new("as_of")
                            .long("as-of")
                            .help("Balance cutoff date (inclusive)"),
                    ),
                ))
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("account").required(true))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("balance").long("balance"))
                        .arg(Arg::new("start").long("start")),
                )
                .subcommand(Command::new("rm").arg(Arg::new("account").required(true))),
        )
        .subcommand(
            Command::new("category")
                .about("Manage budget categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("color").long("color").default_value("#9E9E9E"))
                        .arg(Arg::new("monthly").long("monthly").required(true))
                        .arg(Arg::new("weekly").long("weekly"))
                        .arg(
                            Arg::new("recurring_day")
                                .long("recurring-day")
                                .value_parser(value_parser!(u8).range(1..=31)),
                        )
                        .arg(Arg::new("account").long("account").default_value("pnc"))
                        .arg(Arg::new("icon").long("icon")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("budget")
                        .about("Set the monthly budget; the weekly one follows")
                        .arg(category_pos())
                        .arg(Arg::new("monthly").required(true)),
                )
                .subcommand(Command::new("rm").arg(category_pos())),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and browse transactions")
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("expense")
                                .value_parser(["income", "expense", "transfer", "adjustment"]),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("account").long("account").default_value("pnc"))
                        .arg(Arg::new("to").long("to").help("Destination account for transfers"))
                        .arg(Arg::new("category").long("category"))
                        .arg(date_arg())
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(date_arg())
                        .arg(Arg::new("from").long("from"))
                        .arg(Arg::new("to").long("to"))
                        .arg(Arg::new("limit").long("limit").value_parser(value_parser!(usize))),
                ))
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(Command::new("rm").arg(Arg::new("id").required(true)))
                .subcommand(
                    Command::new("clear")
                        .about("Delete all transactions and recurring bill records")
                        .arg(
                            Arg::new("yes")
                                .long("yes")
                                .action(ArgAction::SetTrue)
                                .help("Confirm the deletion"),
                        ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Balances and budget analytics")
                .subcommand(json_flags(Command::new("day").arg(date_arg())))
                .subcommand(json_flags(Command::new("week").arg(date_arg())))
                .subcommand(json_flags(Command::new("month").arg(month_arg())))
                .subcommand(json_flags(
                    Command::new("budget")
                        .arg(month_arg())
                        .arg(
                            Arg::new("weekly")
                                .long("weekly")
                                .action(ArgAction::SetTrue)
                                .help("Progress for the week containing --date"),
                        )
                        .arg(date_arg()),
                )),
        )
        .subcommand(
            Command::new("recurring")
                .about("Confirm, skip and post this month's recurring bills")
                .subcommand(json_flags(Command::new("list").arg(month_arg())))
                .subcommand(
                    Command::new("confirm")
                        .arg(month_arg())
                        .arg(category_pos())
                        .arg(
                            Arg::new("undo")
                                .long("undo")
                                .action(ArgAction::SetTrue)
                                .help("Clear the confirmation instead"),
                        ),
                )
                .subcommand(Command::new("skip").arg(month_arg()).arg(category_pos()))
                .subcommand(Command::new("unskip").arg(month_arg()).arg(category_pos()))
                .subcommand(
                    Command::new("amount")
                        .arg(month_arg())
                        .arg(category_pos())
                        .arg(Arg::new("amount").required(true)),
                )
                .subcommand(Command::new("post").arg(month_arg())),
        )
        .subcommand(
            Command::new("income")
                .about("Income configs and paychecks")
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("paycheck").arg(date_arg()))
                .subcommand(Command::new("next").arg(date_arg())),
        )
        .subcommand(
            Command::new("settings")
                .about("Show or change preferences")
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("theme")
                                .long("theme")
                                .value_parser(["dark", "light"]),
                        )
                        .arg(
                            Arg::new("week_start")
                                .long("week-start")
                                .value_parser(["sunday", "monday"]),
                        )
                        .arg(
                            Arg::new("notifications")
                                .long("notifications")
                                .value_parser(["on", "off"]),
                        )
                        .arg(Arg::new("time").long("time").help("Reminder time HH:mm"))
                        .arg(Arg::new("currency").long("currency")),
                )
                .subcommand(Command::new("remind").about("Preview next month's bill reminder")),
        )
        .subcommand(
            Command::new("backup")
                .about("JSON backup/restore and CSV export")
                .subcommand(
                    Command::new("export").arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("import").arg(Arg::new("file").long("file").required(true)),
                )
                .subcommand(Command::new("csv").arg(Arg::new("out").long("out").required(true))),
        )
}
