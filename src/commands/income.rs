// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::format_currency;
use crate::dates::format_date_display;
use crate::db::Storage;
use crate::income;
use crate::models::IncomeType;
use crate::store::LedgerStore;
use crate::utils::{date_or_today, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle<S: Storage>(store: &mut LedgerStore<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let data = store.income_configs();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|c| {
                        let amount = match (c.amount, c.min_amount, c.max_amount) {
                            (Some(a), _, _) => format_currency(a),
                            (None, Some(lo), Some(hi)) => {
                                format!("{} - {}", format_currency(lo), format_currency(hi))
                            }
                            _ => String::new(),
                        };
                        let splits = c
                            .splits
                            .iter()
                            .map(|s| format!("{} {}%", s.account_id, s.percentage.normalize()))
                            .collect::<Vec<_>>()
                            .join(", ");
                        vec![c.id.clone(), c.r#type.as_str().to_string(), amount, splits]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Id", "Type", "Amount", "Splits"], rows)
                );
            }
        }
        Some(("paycheck", sub)) => {
            let date = date_or_today(sub, "date", store)?;
            let n = income::post_paycheck(store, date)?;
            if n == 0 {
                println!("No paycheck to post on {}", date);
            } else {
                println!("Posted paycheck on {} across {} account(s)", date, n);
            }
        }
        Some(("next", sub)) => {
            let from = date_or_today(sub, "date", store)?;
            match store.income_config_of_type(IncomeType::WeeklyPaycheck) {
                Some(cfg) => match income::next_paycheck_date(cfg, from)? {
                    Some(d) => println!("Next paycheck: {}", format_date_display(d)),
                    None => println!("Paycheck has no day of week configured"),
                },
                None => println!("No weekly paycheck configured"),
            }
        }
        _ => {}
    }
    Ok(())
}
