// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::format_currency;
use crate::dates::{format_month_year, month_key};
use crate::db::Storage;
use crate::recurring;
use crate::store::LedgerStore;
use crate::utils::{category_id, maybe_print_json, parse_amount, pretty_table, required};
use anyhow::Result;

use super::reports::month_or_current;

pub fn handle<S: Storage>(store: &mut LedgerStore<S>, m: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub)) = m.subcommand() else {
        return Ok(());
    };
    let month = month_key(month_or_current(store, sub)?);
    match name {
        "list" => list(store, sub, &month)?,
        "confirm" => {
            let id = category_id(store, required(sub, "category")?)?;
            let undo = sub.get_flag("undo");
            recurring::set_confirmed(store, &month, &id, !undo)?;
            println!(
                "{} '{}' for {}",
                if undo { "Unconfirmed" } else { "Confirmed" },
                id,
                month
            );
        }
        "skip" => {
            let id = category_id(store, required(sub, "category")?)?;
            recurring::skip(store, &month, &id)?;
            println!("Skipped '{}' for {}", id, month);
        }
        "unskip" => {
            let id = category_id(store, required(sub, "category")?)?;
            recurring::unskip(store, &month, &id)?;
            println!("Unskipped '{}' for {}", id, month);
        }
        "amount" => {
            let id = category_id(store, required(sub, "category")?)?;
            let amount = parse_amount(required(sub, "amount")?)?;
            recurring::override_amount(store, &month, &id, amount)?;
            println!("'{}' set to {} for {}", id, format_currency(amount), month);
        }
        "post" => {
            let n = recurring::post_confirmed(store, &month)?;
            println!("Recorded {} recurring expense(s) for {}", n, month);
        }
        _ => {}
    }
    Ok(())
}

fn list<S: Storage>(store: &mut LedgerStore<S>, sub: &clap::ArgMatches, month: &str) -> Result<()> {
    let items = recurring::recurring_items(store, month)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    let rows = items
        .iter()
        .map(|i| {
            let state = match (i.confirmed, i.skipped) {
                (_, true) => "skipped",
                (true, _) => "confirmed",
                _ => "pending",
            };
            vec![
                i.category_id.clone(),
                i.name.clone(),
                format_currency(i.amount),
                state.to_string(),
            ]
        })
        .collect();
    let first = crate::dates::parse_month(month)?;
    println!("Monthly recurring, {}", format_month_year(first));
    println!(
        "{}",
        pretty_table(&["Id", "Bill", "Amount", "Status"], rows)
    );
    // Balance on the 1st of whichever account the bills draw from.
    let total = recurring::pending_total(&items);
    let mut accounts: Vec<&str> = items.iter().map(|i| i.account_id.as_str()).collect();
    accounts.sort_unstable();
    accounts.dedup();
    println!("Total {}", format_currency(total));
    for acc in accounts {
        let due: rust_decimal::Decimal = items
            .iter()
            .filter(|i| !i.skipped && i.account_id == acc)
            .map(|i| i.amount)
            .sum();
        let balance = store.account_balance(acc, Some(first));
        println!(
            "{}: {} on the 1st, {} after bills",
            store.account(acc).map_or(acc, |a| a.name.as_str()),
            format_currency(balance),
            format_currency(balance - due)
        );
    }
    Ok(())
}
