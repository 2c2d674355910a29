// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pennywise::db::{self, Database};
use pennywise::store::LedgerStore;
use pennywise::{cli, commands, seed};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if matches.get_flag("verbose") {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let path = match matches.get_one::<String>("db") {
        Some(p) => PathBuf::from(p),
        None => db::db_path()?,
    };
    let mut database = Database::new(&path);
    database
        .init()
        .with_context(|| format!("Cannot open database at {}", path.display()))?;

    let mut store = LedgerStore::with_system_clock(database);
    if let Some(("init", _)) = matches.subcommand() {
        let seeded = seed::seed_initial_data(store.storage(), store.clock())?;
        println!(
            "Database {} at {}",
            if seeded { "initialized" } else { "already initialized" },
            path.display()
        );
        return Ok(());
    }
    let res = run(&mut store, &matches);
    if let Err(e) = &res {
        if e
            .downcast_ref::<pennywise::Error>()
            .is_some_and(pennywise::Error::is_precondition)
        {
            eprintln!("hint: run `pennywise init` to create the default ledger");
        }
    }
    res
}

fn run(store: &mut LedgerStore<Database>, matches: &ArgMatches) -> Result<()> {
    store.load()?;

    match matches.subcommand() {
        Some(("account", sub)) => commands::accounts::handle(store, sub)?,
        Some(("category", sub)) => commands::categories::handle(store, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(store, sub)?,
        Some(("report", sub)) => commands::reports::handle(store, sub)?,
        Some(("recurring", sub)) => commands::recurring::handle(store, sub)?,
        Some(("income", sub)) => commands::income::handle(store, sub)?,
        Some(("settings", sub)) => commands::settings::handle(store, sub)?,
        Some(("backup", sub)) => commands::backup::handle(store, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
