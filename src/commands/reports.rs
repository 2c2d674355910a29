// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::{self, format_currency};
use crate::dates::{format_date_display, format_month_year, format_week_range, week_boundaries};
use crate::db::Storage;
use crate::models::{BudgetProgress, WeekStart};
use crate::store::LedgerStore;
use crate::utils::{date_or_today, maybe_print_json, parse_month, pretty_table};
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle<S: Storage>(store: &LedgerStore<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("day", sub)) => day(store, sub)?,
        Some(("week", sub)) => week(store, sub)?,
        Some(("month", sub)) => month(store, sub)?,
        Some(("budget", sub)) => budget(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn json_requested(sub: &clap::ArgMatches) -> (bool, bool) {
    (sub.get_flag("json"), sub.get_flag("jsonl"))
}

pub fn month_or_current<S: Storage>(
    store: &LedgerStore<S>,
    sub: &clap::ArgMatches,
) -> Result<NaiveDate> {
    match sub.get_one::<String>("month") {
        Some(s) => parse_month(s),
        None => Ok(store.today()),
    }
}

fn week_start<S: Storage>(store: &LedgerStore<S>) -> WeekStart {
    store.settings().map(|s| s.week_start).unwrap_or_default()
}

#[derive(Serialize)]
struct DaySummary {
    date: NaiveDate,
    income: Decimal,
    expenses: Decimal,
    net: Decimal,
    balances: Vec<(String, Decimal)>,
}

fn day<S: Storage>(store: &LedgerStore<S>, sub: &clap::ArgMatches) -> Result<()> {
    let date = date_or_today(sub, "date", store)?;
    let txns = store.transactions_for_date(date);
    let summary = DaySummary {
        date,
        income: calc::income_total(&txns),
        expenses: calc::expense_total(&txns),
        net: calc::daily_total(&txns),
        balances: store
            .accounts()
            .iter()
            .map(|a| (a.name.clone(), store.account_balance(&a.id, Some(date))))
            .collect(),
    };
    let (json, jsonl) = json_requested(sub);
    if maybe_print_json(json, jsonl, &summary)? {
        return Ok(());
    }
    println!("{}", format_date_display(date));
    let rows = txns
        .iter()
        .map(|t| {
            let row = super::transactions::to_row(store, t);
            vec![row.r#type, row.category, row.amount, row.note]
        })
        .collect();
    println!("{}", pretty_table(&["Type", "Category", "Amount", "Note"], rows));
    println!(
        "Income {}  Expenses {}  Net {}",
        format_currency(summary.income),
        format_currency(summary.expenses),
        format_currency(summary.net)
    );
    for (name, bal) in &summary.balances {
        println!("{}: {}", name, format_currency(*bal));
    }
    Ok(())
}

fn week<S: Storage>(store: &LedgerStore<S>, sub: &clap::ArgMatches) -> Result<()> {
    let date = date_or_today(sub, "date", store)?;
    let (start, end) = week_boundaries(date, week_start(store));
    let wb = calc::weekly_breakdown(store.transactions(), store.accounts(), start, end);
    let (json, jsonl) = json_requested(sub);
    if maybe_print_json(json, jsonl, &wb)? {
        return Ok(());
    }
    println!("Week of {}", format_week_range(start, end));
    let rows = store
        .accounts()
        .iter()
        .map(|a| {
            let s = wb.starting_balance.get(&a.id).copied().unwrap_or_default();
            let e = wb.ending_balance.get(&a.id).copied().unwrap_or_default();
            vec![
                a.name.clone(),
                format_currency(s),
                format_currency(e),
                format_currency(e - s),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Account", "Start", "End", "Change"], rows)
    );
    let cats = wb
        .expenses
        .by_category
        .iter()
        .map(|(id, amt)| {
            let name = store.category(id).map_or(id.as_str(), |c| c.name.as_str());
            vec![name.to_string(), format_currency(*amt)]
        })
        .collect();
    println!("{}", pretty_table(&["Category", "Spent"], cats));
    println!(
        "Income {}  Expenses {}  Net change {}",
        format_currency(wb.income.total),
        format_currency(wb.expenses.total),
        format_currency(wb.net_change)
    );
    Ok(())
}

fn month<S: Storage>(store: &LedgerStore<S>, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_or_current(store, sub)?;
    let ma = calc::monthly_analytics(
        store.transactions(),
        store.accounts(),
        store.categories(),
        month,
    );
    let (json, jsonl) = json_requested(sub);
    if maybe_print_json(json, jsonl, &ma)? {
        return Ok(());
    }
    println!("{}", format_month_year(month));
    let rows = ma
        .category_spending
        .iter()
        .map(|cs| {
            let name = store
                .category(&cs.category_id)
                .map_or(cs.category_id.clone(), |c| c.name.clone());
            vec![
                name,
                format_currency(cs.planned),
                format_currency(cs.actual),
                format!("{}%", cs.percentage.round_dp(1)),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Planned", "Actual", "Used"], rows)
    );
    println!(
        "Income {}  Expenses {}  Savings rate {}%",
        format_currency(ma.total_income),
        format_currency(ma.total_expenses),
        ma.savings_rate.round_dp(1)
    );
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BudgetRow {
    category_id: String,
    name: String,
    #[serde(flatten)]
    progress: BudgetProgress,
}

fn budget<S: Storage>(store: &LedgerStore<S>, sub: &clap::ArgMatches) -> Result<()> {
    let weekly = sub.get_flag("weekly");
    let (title, progress): (String, Vec<BudgetRow>) = if weekly {
        let date = date_or_today(sub, "date", store)?;
        let (start, end) = week_boundaries(date, week_start(store));
        let rows = store
            .categories()
            .iter()
            .filter(|c| !c.recurring)
            .map(|c| BudgetRow {
                category_id: c.id.clone(),
                name: c.name.clone(),
                progress: calc::weekly_budget_progress(store.transactions(), c, start, end),
            })
            .collect();
        (format_week_range(start, end), rows)
    } else {
        let month = month_or_current(store, sub)?;
        let rows = store
            .categories()
            .iter()
            .map(|c| BudgetRow {
                category_id: c.id.clone(),
                name: c.name.clone(),
                progress: calc::monthly_budget_progress(store.transactions(), c, month),
            })
            .collect();
        (format_month_year(month), rows)
    };
    let (json, jsonl) = json_requested(sub);
    if maybe_print_json(json, jsonl, &progress)? {
        return Ok(());
    }
    println!("Budget progress, {}", title);
    let rows = progress
        .iter()
        .map(|r| {
            vec![
                r.name.clone(),
                format_currency(r.progress.budget),
                format_currency(r.progress.spent),
                format_currency(r.progress.remaining),
                format!("{}%", r.progress.percentage.round_dp(1)),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Budget", "Spent", "Remaining", "Used"], rows)
    );
    Ok(())
}
