// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::format_currency;
use crate::db::Storage;
use crate::models::{CategoryPatch, NewCategory};
use crate::store::LedgerStore;
use crate::utils::{account_id, category_id, maybe_print_json, parse_amount, pretty_table, required};
use anyhow::Result;

pub fn handle<S: Storage>(store: &mut LedgerStore<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required(sub, "name")?;
            let recurring_day = sub.get_one::<u8>("recurring_day").copied();
            let account = account_id(store, required(sub, "account")?)?;
            let cat = store.add_category(NewCategory {
                name: name.clone(),
                color: required(sub, "color")?.clone(),
                planned_monthly: parse_amount(required(sub, "monthly")?)?,
                planned_weekly: sub
                    .get_one::<String>("weekly")
                    .map(|s| parse_amount(s))
                    .transpose()?,
                recurring: recurring_day.is_some(),
                recurring_day,
                account_id: account,
                icon: sub.get_one::<String>("icon").cloned(),
            })?;
            println!("Added category '{}' id={}", cat.name, cat.id);
        }
        Some(("list", sub)) => {
            let data = store.categories();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|c| {
                        vec![
                            c.id.clone(),
                            c.name.clone(),
                            format_currency(c.planned_monthly),
                            format_currency(c.weekly_budget().round_dp(2)),
                            c.recurring_day
                                .map(|d| format!("day {}", d))
                                .unwrap_or_default(),
                            c.account_id.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Id", "Name", "Monthly", "Weekly", "Recurring", "Account"],
                        rows
                    )
                );
            }
        }
        Some(("budget", sub)) => {
            let id = category_id(store, required(sub, "category")?)?;
            let monthly = parse_amount(required(sub, "monthly")?)?;
            let cat = store.update_category(&id, CategoryPatch::budget(monthly))?;
            println!(
                "Budget for '{}' set to {} monthly ({} weekly)",
                cat.name,
                format_currency(cat.planned_monthly),
                format_currency(cat.weekly_budget())
            );
        }
        Some(("rm", sub)) => {
            let id = category_id(store, required(sub, "category")?)?;
            store.delete_category(&id)?;
            println!("Removed category '{}'", id);
        }
        _ => {}
    }
    Ok(())
}
