// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{d, seeded_store};
use pennywise::db::{Database, Storage};
use pennywise::models::TransactionType;
use pennywise::recurring::{
    override_amount, pending_total, post_confirmed, recurring_items, set_confirmed, skip, unskip,
};
use pennywise::store::LedgerStore;
use pennywise::Error;
use rust_decimal_macros::dec;

const MONTH: &str = "2025-12";

fn skip_all_but_rent(store: &mut LedgerStore<Database>) {
    for id in ["electricity", "internet", "phone", "car_payment", "car_insurance"] {
        skip(store, MONTH, id).unwrap();
    }
}

#[test]
fn items_default_to_pending_at_planned_amount() {
    let mut store = seeded_store(d(2025, 11, 20));
    let items = recurring_items(&mut store, MONTH).unwrap();
    assert_eq!(items.len(), 6);
    assert!(items.iter().all(|i| !i.confirmed && !i.skipped));
    let rent = items.iter().find(|i| i.category_id == "rent").unwrap();
    assert_eq!(rent.amount, dec!(975));
    assert_eq!(rent.default_amount, dec!(975));
    assert_eq!(pending_total(&items), dec!(1615));
    // reading does not write statuses
    assert!(store.storage().select_recurring_statuses(MONTH).unwrap().is_empty());
}

#[test]
fn status_changes_are_kept_per_month() {
    let mut store = seeded_store(d(2025, 11, 20));
    override_amount(&mut store, MONTH, "electricity", dec!(42.10)).unwrap();
    skip(&mut store, MONTH, "phone").unwrap();
    set_confirmed(&mut store, MONTH, "rent", true).unwrap();

    let items = recurring_items(&mut store, MONTH).unwrap();
    let elec = items.iter().find(|i| i.category_id == "electricity").unwrap();
    assert_eq!(elec.amount, dec!(42.10));
    assert_eq!(elec.default_amount, dec!(30));
    assert!(items.iter().find(|i| i.category_id == "phone").unwrap().skipped);
    assert!(items.iter().find(|i| i.category_id == "rent").unwrap().confirmed);
    assert_eq!(pending_total(&items), dec!(1572.10));

    let other = recurring_items(&mut store, "2026-01").unwrap();
    assert!(other.iter().all(|i| !i.confirmed && !i.skipped));

    // one row per (month, category) no matter how often it changes
    set_confirmed(&mut store, MONTH, "rent", false).unwrap();
    set_confirmed(&mut store, MONTH, "rent", true).unwrap();
    assert_eq!(store.storage().select_recurring_statuses(MONTH).unwrap().len(), 3);
}

#[test]
fn skipped_bill_must_be_unskipped_before_confirming() {
    let mut store = seeded_store(d(2025, 11, 20));
    skip(&mut store, MONTH, "internet").unwrap();
    let err = set_confirmed(&mut store, MONTH, "internet", true).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
    unskip(&mut store, MONTH, "internet").unwrap();
    let s = set_confirmed(&mut store, MONTH, "internet", true).unwrap();
    assert!(s.confirmed && !s.skipped);
}

#[test]
fn non_recurring_and_unknown_categories_are_rejected() {
    let mut store = seeded_store(d(2025, 11, 20));
    assert!(matches!(
        set_confirmed(&mut store, MONTH, "food", true),
        Err(Error::InvalidData(_))
    ));
    assert!(matches!(
        skip(&mut store, MONTH, "nope"),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        override_amount(&mut store, MONTH, "rent", dec!(-1)),
        Err(Error::InvalidData(_))
    ));
    assert!(skip(&mut store, "2025-13", "rent").is_err());
}

#[test]
fn posting_requires_every_bill_settled() {
    let mut store = seeded_store(d(2025, 11, 20));
    set_confirmed(&mut store, MONTH, "rent", true).unwrap();
    let err = post_confirmed(&mut store, MONTH).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid data: You have 5 unconfirmed items. Confirm all first or skip them."
    );
    assert!(store.transactions().is_empty());
}

#[test]
fn posting_with_everything_skipped_is_refused() {
    let mut store = seeded_store(d(2025, 11, 20));
    skip_all_but_rent(&mut store);
    skip(&mut store, MONTH, "rent").unwrap();
    let err = post_confirmed(&mut store, MONTH).unwrap_err();
    assert!(err.to_string().contains("No expenses confirmed"));
}

#[test]
fn confirmed_bills_post_on_the_first_once() {
    let mut store = seeded_store(d(2025, 11, 20));
    skip_all_but_rent(&mut store);
    set_confirmed(&mut store, MONTH, "rent", true).unwrap();

    assert_eq!(post_confirmed(&mut store, MONTH).unwrap(), 1);
    let txns = store.transactions_for_date(d(2025, 12, 1));
    assert_eq!(txns.len(), 1);
    let rent = &txns[0];
    assert_eq!(rent.r#type, TransactionType::Expense);
    assert_eq!(rent.amount, dec!(975));
    assert_eq!(rent.account_id, "pnc");
    assert_eq!(rent.category_id.as_deref(), Some("rent"));
    assert_eq!(rent.note.as_deref(), Some("Monthly Rent"));
    assert_eq!(rent.timestamp, d(2025, 12, 1).and_hms_opt(0, 0, 0).unwrap().and_utc());

    assert_eq!(post_confirmed(&mut store, MONTH).unwrap(), 0);
    store.load().unwrap();
    assert_eq!(post_confirmed(&mut store, MONTH).unwrap(), 0);
    assert_eq!(store.transactions().len(), 1);
}

#[test]
fn overridden_amount_is_what_gets_posted() {
    let mut store = seeded_store(d(2025, 11, 20));
    skip_all_but_rent(&mut store);
    override_amount(&mut store, MONTH, "rent", dec!(1000)).unwrap();
    set_confirmed(&mut store, MONTH, "rent", true).unwrap();
    post_confirmed(&mut store, MONTH).unwrap();
    assert_eq!(store.transactions()[0].amount, dec!(1000));
    assert_eq!(
        store.account_balance("pnc", Some(d(2025, 12, 1))),
        dec!(810.63) - dec!(1000)
    );
}

#[test]
fn deleting_a_category_drops_its_statuses() {
    let mut store = seeded_store(d(2025, 11, 20));
    skip(&mut store, MONTH, "phone").unwrap();
    store.delete_category("phone").unwrap();
    assert!(store.storage().select_recurring_statuses(MONTH).unwrap().is_empty());
    assert_eq!(recurring_items(&mut store, MONTH).unwrap().len(), 5);
}
