// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Month-by-month review of recurring bills: confirm, skip or override each
//! one, then post the confirmed set as expenses on the 1st.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::dates::{month_key, parse_month};
use crate::db::Storage;
use crate::error::{Error, Result};
use crate::models::{Category, NewTransaction, RecurringStatus, TransactionType};
use crate::store::{new_id, LedgerStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringItem {
    pub category_id: String,
    pub name: String,
    pub color: String,
    pub account_id: String,
    pub confirmed: bool,
    pub skipped: bool,
    pub amount: Decimal,
    pub default_amount: Decimal,
}

fn month_start(month: &str) -> Result<NaiveDate> {
    parse_month(month)
}

fn recurring_category<S: Storage>(store: &LedgerStore<S>, category_id: &str) -> Result<Category> {
    match store.category(category_id) {
        Some(c) if c.recurring => Ok(c.clone()),
        Some(_) => Err(Error::InvalidData(format!(
            "category '{}' is not recurring",
            category_id
        ))),
        None => Err(Error::NotFound(format!("category '{}'", category_id))),
    }
}

/// One item per recurring category, with this month's saved status or the
/// defaults when nothing has been recorded yet.
pub fn recurring_items<S: Storage>(
    store: &mut LedgerStore<S>,
    month: &str,
) -> Result<Vec<RecurringItem>> {
    let key = month_key(month_start(month)?);
    let statuses = store.recurring_statuses(&key)?;
    Ok(store
        .categories()
        .iter()
        .filter(|c| c.recurring)
        .map(|c| {
            let saved = statuses.iter().find(|s| s.category_id == c.id);
            RecurringItem {
                category_id: c.id.clone(),
                name: c.name.clone(),
                color: c.color.clone(),
                account_id: c.account_id.clone(),
                confirmed: saved.is_some_and(|s| s.confirmed),
                skipped: saved.is_some_and(|s| s.skipped),
                amount: saved.map_or(c.planned_monthly, |s| s.amount),
                default_amount: c.planned_monthly,
            }
        })
        .collect())
}

fn modify_status<S, F>(
    store: &mut LedgerStore<S>,
    month: &str,
    category_id: &str,
    change: F,
) -> Result<RecurringStatus>
where
    S: Storage,
    F: FnOnce(&mut RecurringStatus) -> Result<()>,
{
    let key = month_key(month_start(month)?);
    let category = recurring_category(store, category_id)?;
    let now = store.now();
    let mut status = store
        .recurring_statuses(&key)?
        .into_iter()
        .find(|s| s.category_id == category_id)
        .unwrap_or_else(|| RecurringStatus {
            id: new_id(),
            month: key.clone(),
            category_id: category.id.clone(),
            confirmed: false,
            skipped: false,
            amount: category.planned_monthly,
            notification_sent: false,
            created_at: now,
            updated_at: now,
        });
    change(&mut status)?;
    status.updated_at = now;
    store.upsert_recurring_status(&status)?;
    Ok(status)
}

/// Skipped bills cannot be confirmed until they are unskipped.
pub fn set_confirmed<S: Storage>(
    store: &mut LedgerStore<S>,
    month: &str,
    category_id: &str,
    confirmed: bool,
) -> Result<RecurringStatus> {
    modify_status(store, month, category_id, |s| {
        if confirmed && s.skipped {
            return Err(Error::InvalidData(format!(
                "'{}' is skipped for {}; unskip it first",
                s.category_id, s.month
            )));
        }
        s.confirmed = confirmed;
        Ok(())
    })
}

pub fn skip<S: Storage>(
    store: &mut LedgerStore<S>,
    month: &str,
    category_id: &str,
) -> Result<RecurringStatus> {
    modify_status(store, month, category_id, |s| {
        s.skipped = true;
        s.confirmed = false;
        Ok(())
    })
}

pub fn unskip<S: Storage>(
    store: &mut LedgerStore<S>,
    month: &str,
    category_id: &str,
) -> Result<RecurringStatus> {
    modify_status(store, month, category_id, |s| {
        s.skipped = false;
        Ok(())
    })
}

pub fn override_amount<S: Storage>(
    store: &mut LedgerStore<S>,
    month: &str,
    category_id: &str,
    amount: Decimal,
) -> Result<RecurringStatus> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::InvalidData(format!(
            "amount must be non-negative, got {}",
            amount
        )));
    }
    modify_status(store, month, category_id, |s| {
        s.amount = amount;
        Ok(())
    })
}

/// What this month's bills will take out, ignoring skipped ones.
pub fn pending_total(items: &[RecurringItem]) -> Decimal {
    items.iter().filter(|i| !i.skipped).map(|i| i.amount).sum()
}

/// Records each confirmed bill as an expense dated the 1st of `month`.
/// Bills already posted for the month are not posted twice.
pub fn post_confirmed<S: Storage>(store: &mut LedgerStore<S>, month: &str) -> Result<usize> {
    let first = month_start(month)?;
    let items = recurring_items(store, month)?;

    let open = items.iter().filter(|i| !i.confirmed && !i.skipped).count();
    if open > 0 {
        return Err(Error::InvalidData(format!(
            "You have {} unconfirmed items. Confirm all first or skip them.",
            open
        )));
    }
    let confirmed: Vec<&RecurringItem> = items.iter().filter(|i| i.confirmed).collect();
    if confirmed.is_empty() {
        return Err(Error::InvalidData(
            "No expenses confirmed. Please confirm at least one item.".into(),
        ));
    }

    let timestamp = first
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|| store.now());
    let mut posted = 0;
    for item in confirmed {
        let note = format!("Monthly {}", item.name);
        let exists = store.transactions_for_date(first).iter().any(|t| {
            t.r#type == TransactionType::Expense
                && t.category_id.as_deref() == Some(item.category_id.as_str())
                && t.note.as_deref() == Some(note.as_str())
        });
        if exists {
            continue;
        }
        store.add_transaction(
            NewTransaction::new(
                TransactionType::Expense,
                item.amount,
                &item.account_id,
                first,
                timestamp,
            )
            .category(&item.category_id)
            .note(note),
        )?;
        posted += 1;
    }
    info!(month = %month_key(first), posted, "recurring bills posted");
    Ok(posted)
}
