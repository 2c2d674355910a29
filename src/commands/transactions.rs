// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::format_currency;
use crate::db::Storage;
use crate::models::{NewTransaction, Transaction, TransactionPatch, TransactionType};
use crate::store::LedgerStore;
use crate::utils::{
    account_id, category_id, date_or_today, maybe_print_json, parse_amount, parse_date,
    pretty_table, required,
};
use anyhow::{bail, Result};
use serde::Serialize;

pub fn handle<S: Storage>(store: &mut LedgerStore<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            store.delete_transaction(id)?;
            println!("Removed transaction {}", id);
        }
        Some(("clear", sub)) => {
            if !sub.get_flag("yes") {
                bail!("This deletes every transaction and recurring bill record; pass --yes to confirm");
            }
            store.clear_all_data()?;
            println!("All transactions cleared. Accounts and categories were kept.");
        }
        _ => {}
    }
    Ok(())
}

fn add<S: Storage>(store: &mut LedgerStore<S>, sub: &clap::ArgMatches) -> Result<()> {
    let typ: TransactionType = required(sub, "type")?.parse()?;
    let amount = parse_amount(required(sub, "amount")?)?;
    let account = account_id(store, required(sub, "account")?)?;
    let date = date_or_today(sub, "date", store)?;

    let mut input = NewTransaction::new(typ, amount, account, date, store.now());
    if let Some(to) = sub.get_one::<String>("to") {
        input = input.to_account(account_id(store, to)?);
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        input = input.category(category_id(store, cat)?);
    }
    if let Some(note) = sub.get_one::<String>("note") {
        input = input.note(note.clone());
    }
    let txn = store.add_transaction(input)?;
    println!(
        "Recorded {} {} on {} (acct: {}) id={}",
        txn.r#type,
        format_currency(txn.amount),
        txn.date,
        txn.account_id,
        txn.id
    );
    Ok(())
}

fn edit<S: Storage>(store: &mut LedgerStore<S>, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let category = match sub.get_one::<String>("category") {
        Some(c) if c.is_empty() => Some(None),
        Some(c) => Some(Some(category_id(store, c)?)),
        None => None,
    };
    let patch = TransactionPatch {
        amount: sub
            .get_one::<String>("amount")
            .map(|s| parse_amount(s))
            .transpose()?,
        date: sub
            .get_one::<String>("date")
            .map(|s| parse_date(s))
            .transpose()?,
        category_id: category,
        note: sub
            .get_one::<String>("note")
            .map(|n| (!n.is_empty()).then(|| n.clone())),
        ..Default::default()
    };
    let txn = store.update_transaction(id, patch)?;
    println!("Updated transaction {}", txn.id);
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub r#type: String,
    pub account: String,
    pub to_account: String,
    pub category: String,
    pub amount: String,
    pub note: String,
}

fn name_of_account<S: Storage>(store: &LedgerStore<S>, id: &str) -> String {
    store
        .account(id)
        .map_or_else(|| id.to_string(), |a| a.name.clone())
}

pub fn to_row<S: Storage>(store: &LedgerStore<S>, t: &Transaction) -> TransactionRow {
    TransactionRow {
        id: t.id.clone(),
        date: t.date.to_string(),
        r#type: t.r#type.to_string(),
        account: name_of_account(store, &t.account_id),
        to_account: t
            .to_account_id
            .as_deref()
            .map(|id| name_of_account(store, id))
            .unwrap_or_default(),
        category: t
            .category_id
            .as_deref()
            .map(|c| store.category(c).map_or_else(|| c.to_string(), |cat| cat.name.clone()))
            .unwrap_or_default(),
        amount: t.amount.to_string(),
        note: t.note.clone().unwrap_or_default(),
    }
}

/// Filters apply in order: single date, then from/to range, then limit.
pub fn query_rows<S: Storage>(
    store: &LedgerStore<S>,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let mut txns: Vec<Transaction> = if let Some(d) = sub.get_one::<String>("date") {
        store.transactions_for_date(parse_date(d)?)
    } else {
        let from = sub
            .get_one::<String>("from")
            .map(|s| parse_date(s))
            .transpose()?;
        let to = sub
            .get_one::<String>("to")
            .map(|s| parse_date(s))
            .transpose()?;
        match (from, to) {
            (None, None) => store.transactions().to_vec(),
            (f, t) => store.transactions_for_date_range(
                f.unwrap_or(chrono::NaiveDate::MIN),
                t.unwrap_or(chrono::NaiveDate::MAX),
            ),
        }
    };
    if let Some(limit) = sub.get_one::<usize>("limit") {
        txns.truncate(*limit);
    }
    Ok(txns.iter().map(|t| to_row(store, t)).collect())
}

fn list<S: Storage>(store: &LedgerStore<S>, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(store, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.r#type.clone(),
                    r.account.clone(),
                    r.to_account.clone(),
                    r.category.clone(),
                    r.amount.clone(),
                    r.note.clone(),
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Type", "Account", "To", "Category", "Amount", "Note", "Id"],
                rows,
            )
        );
    }
    Ok(())
}
