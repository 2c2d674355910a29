// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::dates::{next_occurrence_of_weekday, weekday_from_index, weekday_index};
use crate::db::Storage;
use crate::error::{Error, Result};
use crate::models::{IncomeConfig, IncomeSplit, IncomeType, NewTransaction, TransactionType};
use crate::store::LedgerStore;

const PAYCHECK_MARKER: &str = "paycheck";

/// Split percentages must add up to exactly 100.
pub fn validate_splits(splits: &[IncomeSplit]) -> Result<()> {
    if let Some(bad) = splits.iter().find(|s| s.percentage.is_sign_negative()) {
        return Err(Error::InvalidData(format!(
            "split for '{}' has negative percentage {}",
            bad.account_id, bad.percentage
        )));
    }
    let total: Decimal = splits.iter().map(|s| s.percentage).sum();
    if total != Decimal::ONE_HUNDRED {
        return Err(Error::InvalidData(format!(
            "split percentages sum to {}, expected 100",
            total.normalize()
        )));
    }
    Ok(())
}

/// Cent amounts owed to each split, in order. Every share but the last is
/// rounded; the last takes whatever is left so the parts add up to `total`.
pub fn split_amounts(total: Decimal, splits: &[IncomeSplit]) -> Vec<Decimal> {
    let mut out = Vec::with_capacity(splits.len());
    let mut assigned = Decimal::ZERO;
    for (i, split) in splits.iter().enumerate() {
        let share = if i + 1 == splits.len() {
            total - assigned
        } else {
            (total * split.percentage / Decimal::ONE_HUNDRED).round_dp(2)
        };
        assigned += share;
        out.push(share);
    }
    out
}

pub fn paycheck_due(config: &IncomeConfig, date: NaiveDate) -> bool {
    config.r#type == IncomeType::WeeklyPaycheck
        && config.amount.is_some()
        && config.day_of_week == Some(weekday_index(date))
}

pub fn next_paycheck_date(config: &IncomeConfig, from: NaiveDate) -> Result<Option<NaiveDate>> {
    match config.day_of_week {
        Some(d) => Ok(Some(next_occurrence_of_weekday(weekday_from_index(d)?, from))),
        None => Ok(None),
    }
}

fn already_posted<S: Storage>(store: &LedgerStore<S>, account_id: &str, date: NaiveDate) -> bool {
    store.transactions_for_date(date).iter().any(|t| {
        t.r#type == TransactionType::Income
            && t.account_id == account_id
            && t
                .note
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(PAYCHECK_MARKER))
    })
}

/// Posts the weekly paycheck for `date` when it is due and not already on
/// the books. Returns how many split transactions were added.
pub fn post_paycheck<S: Storage>(store: &mut LedgerStore<S>, date: NaiveDate) -> Result<usize> {
    let Some(config) = store
        .income_config_of_type(IncomeType::WeeklyPaycheck)
        .cloned()
    else {
        return Ok(0);
    };
    if !paycheck_due(&config, date) {
        return Ok(0);
    }
    let Some(total) = config.amount else {
        return Ok(0);
    };
    if config.splits.is_empty() {
        return Ok(0);
    }
    validate_splits(&config.splits)?;

    let amounts = split_amounts(total, &config.splits);
    let mut posted = 0;
    for (split, amount) in config.splits.iter().zip(amounts) {
        // Checked per account so a retry after a partial post fills the gap.
        if already_posted(store, &split.account_id, date) {
            continue;
        }
        let name = store
            .account(&split.account_id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| split.account_id.clone());
        let now = store.now();
        store.add_transaction(
            NewTransaction::new(TransactionType::Income, amount, &split.account_id, date, now)
                .note(format!("Weekly Paycheck ({})", name)),
        )?;
        posted += 1;
    }
    info!(%date, posted, "weekly paycheck posted");
    Ok(posted)
}
