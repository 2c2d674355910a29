// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs::File;
use std::path::Path;

use crate::backup;
use crate::db::Storage;
use crate::store::LedgerStore;
use crate::utils::required;
use anyhow::{Context, Result};

pub fn handle<S: Storage>(store: &mut LedgerStore<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("export", sub)) => {
            let out = required(sub, "out")?;
            backup::export_to_file(store, Path::new(out))
                .with_context(|| format!("Failed to write backup to {}", out))?;
            println!("Exported ledger to {}", out);
        }
        Some(("import", sub)) => {
            let file = required(sub, "file")?;
            let summary = backup::import_from_file(store, Path::new(file))
                .with_context(|| format!("Failed to import {}", file))?;
            println!(
                "Imported {} account(s), {} categorie(s), {} transaction(s) from {}",
                summary.accounts, summary.categories, summary.transactions, file
            );
        }
        Some(("csv", sub)) => {
            let out = required(sub, "out")?;
            let f = File::create(out).with_context(|| format!("Cannot create {}", out))?;
            let n = backup::export_transactions_csv(store, f)?;
            println!("Exported {} transaction(s) to {}", n, out);
        }
        _ => {}
    }
    Ok(())
}
