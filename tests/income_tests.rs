// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{d, flaky_seeded_store, seeded_store};
use pennywise::income::{next_paycheck_date, post_paycheck};
use pennywise::models::{IncomeConfigPatch, IncomeType, TransactionType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn posted_total<S: pennywise::db::Storage>(
    store: &pennywise::store::LedgerStore<S>,
    date: chrono::NaiveDate,
) -> Decimal {
    store
        .transactions_for_date(date)
        .iter()
        .map(|t| t.amount)
        .sum()
}

#[test]
fn paycheck_posts_one_income_per_split_on_payday() {
    // 2025-11-05 is a Wednesday
    let mut store = seeded_store(d(2025, 11, 5));
    let posted = post_paycheck(&mut store, d(2025, 11, 5)).unwrap();
    assert_eq!(posted, 2);

    let txns = store.transactions_for_date(d(2025, 11, 5));
    assert_eq!(txns.len(), 2);
    assert!(txns.iter().all(|t| t.r#type == TransactionType::Income));
    assert!(txns.iter().all(|t| t.category_id.is_none()));

    let dcu = txns.iter().find(|t| t.account_id == "dcu").unwrap();
    assert_eq!(dcu.amount, dec!(347.42));
    assert_eq!(dcu.note.as_deref(), Some("Weekly Paycheck (DCU Savings)"));
    let pnc = txns.iter().find(|t| t.account_id == "pnc").unwrap();
    assert_eq!(pnc.amount, dec!(810.63));
    assert_eq!(pnc.note.as_deref(), Some("Weekly Paycheck (PNC Spending)"));

    assert_eq!(store.account_balance("pnc", None), dec!(1621.26));
    assert_eq!(store.account_balance("dcu", None), dec!(694.84));
}

#[test]
fn posted_splits_add_up_to_the_paycheck() {
    let mut store = seeded_store(d(2025, 11, 5));
    post_paycheck(&mut store, d(2025, 11, 5)).unwrap();
    let configured = store
        .income_config_of_type(IncomeType::WeeklyPaycheck)
        .and_then(|c| c.amount)
        .unwrap();
    assert_eq!(posted_total(&store, d(2025, 11, 5)), configured);
}

#[test]
fn retry_after_partial_post_fills_the_missing_split() {
    let mut store = flaky_seeded_store(d(2025, 11, 5));
    store.storage().inserts_left.set(Some(1));
    assert!(post_paycheck(&mut store, d(2025, 11, 5)).is_err());
    assert_eq!(store.transactions_for_date(d(2025, 11, 5)).len(), 1);

    store.storage().inserts_left.set(None);
    assert_eq!(post_paycheck(&mut store, d(2025, 11, 5)).unwrap(), 1);
    assert_eq!(store.transactions_for_date(d(2025, 11, 5)).len(), 2);
    assert_eq!(posted_total(&store, d(2025, 11, 5)), dec!(1158.05));
}

#[test]
fn paycheck_is_not_posted_twice() {
    let mut store = seeded_store(d(2025, 11, 5));
    assert_eq!(post_paycheck(&mut store, d(2025, 11, 5)).unwrap(), 2);
    assert_eq!(post_paycheck(&mut store, d(2025, 11, 5)).unwrap(), 0);
    store.load().unwrap();
    assert_eq!(post_paycheck(&mut store, d(2025, 11, 5)).unwrap(), 0);
    assert_eq!(store.transactions().len(), 2);
}

#[test]
fn paycheck_skips_other_weekdays() {
    let mut store = seeded_store(d(2025, 11, 6));
    assert_eq!(post_paycheck(&mut store, d(2025, 11, 6)).unwrap(), 0);
    assert!(store.transactions().is_empty());
}

#[test]
fn paycheck_follows_edited_payday() {
    let mut store = seeded_store(d(2025, 11, 7));
    store
        .update_income_config(
            "weekly_paycheck",
            IncomeConfigPatch {
                day_of_week: Some(Some(5)),
                amount: Some(Some(dec!(1000))),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(post_paycheck(&mut store, d(2025, 11, 5)).unwrap(), 0);
    assert_eq!(post_paycheck(&mut store, d(2025, 11, 7)).unwrap(), 2);
    assert_eq!(posted_total(&store, d(2025, 11, 7)), dec!(1000));
}

#[test]
fn next_paycheck_is_strictly_after_the_given_day() {
    let store = seeded_store(d(2025, 11, 5));
    let cfg = store
        .income_config_of_type(IncomeType::WeeklyPaycheck)
        .unwrap();
    assert_eq!(
        next_paycheck_date(cfg, d(2025, 11, 5)).unwrap(),
        Some(d(2025, 11, 12))
    );
    assert_eq!(
        next_paycheck_date(cfg, d(2025, 11, 3)).unwrap(),
        Some(d(2025, 11, 5))
    );
    let tutoring = store.income_config_of_type(IncomeType::Tutoring).unwrap();
    assert_eq!(next_paycheck_date(tutoring, d(2025, 11, 6)).unwrap(), None);
}
