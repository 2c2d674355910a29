// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::format_currency;
use crate::db::Storage;
use crate::models::{AccountPatch, AccountType, NewAccount};
use crate::store::LedgerStore;
use crate::utils::{
    account_id, maybe_print_json, parse_date, parse_decimal, pretty_table, required,
};
use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle<S: Storage>(store: &mut LedgerStore<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required(sub, "name")?;
            let typ: AccountType = required(sub, "type")?.parse()?;
            let balance = parse_decimal(required(sub, "balance")?)?;
            let start = match sub.get_one::<String>("start") {
                Some(s) => parse_date(s)?,
                None => store.today(),
            };
            let acc = store.add_account(NewAccount {
                name: name.clone(),
                r#type: typ,
                starting_balance: balance,
                starting_date: start,
            })?;
            println!(
                "Added account '{}' ({}, {}) id={}",
                acc.name,
                acc.r#type,
                format_currency(acc.starting_balance),
                acc.id
            );
        }
        Some(("list", sub)) => list(store, sub)?,
        Some(("edit", sub)) => {
            let id = account_id(store, required(sub, "account")?)?;
            let patch = AccountPatch {
                name: sub.get_one::<String>("name").cloned(),
                starting_balance: sub
                    .get_one::<String>("balance")
                    .map(|s| parse_decimal(s))
                    .transpose()?,
                starting_date: sub
                    .get_one::<String>("start")
                    .map(|s| parse_date(s))
                    .transpose()?,
                ..Default::default()
            };
            let acc = store.update_account(&id, patch)?;
            println!("Updated account '{}'", acc.name);
        }
        Some(("rm", sub)) => {
            let id = account_id(store, required(sub, "account")?)?;
            store.delete_account(&id)?;
            println!("Removed account '{}'", id);
        }
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRow {
    pub id: String,
    pub name: String,
    pub r#type: AccountType,
    pub starting_balance: Decimal,
    pub balance: Decimal,
}

pub fn account_rows<S: Storage>(
    store: &LedgerStore<S>,
    as_of: Option<chrono::NaiveDate>,
) -> Vec<AccountRow> {
    store
        .accounts()
        .iter()
        .map(|a| AccountRow {
            id: a.id.clone(),
            name: a.name.clone(),
            r#type: a.r#type,
            starting_balance: a.starting_balance,
            balance: store.account_balance(&a.id, as_of),
        })
        .collect()
}

fn list<S: Storage>(store: &LedgerStore<S>, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = sub
        .get_one::<String>("as_of")
        .map(|s| parse_date(s))
        .transpose()?;
    let data = account_rows(store, as_of);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let mut rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.name.clone(),
                    r.r#type.to_string(),
                    format_currency(r.starting_balance),
                    format_currency(r.balance),
                ]
            })
            .collect();
        rows.push(vec![
            String::new(),
            "Total".into(),
            String::new(),
            String::new(),
            format_currency(store.total_balance(as_of)),
        ]);
        println!(
            "{}",
            pretty_table(&["Id", "Name", "Type", "Starting", "Balance"], rows)
        );
    }
    Ok(())
}
