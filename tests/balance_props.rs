// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use chrono::{Duration, NaiveDate};
use common::{d, seeded_store};
use pennywise::models::{NewTransaction, Transaction, TransactionType};
use proptest::prelude::*;
use rust_decimal::Decimal;

const ACCOUNTS: [&str; 2] = ["pnc", "dcu"];

#[derive(Debug, Clone)]
struct Op {
    kind: TransactionType,
    cents: i64,
    day: i64,
    from: usize,
}

fn op() -> impl Strategy<Value = Op> {
    (
        prop_oneof![
            Just(TransactionType::Income),
            Just(TransactionType::Expense),
            Just(TransactionType::Transfer),
            Just(TransactionType::Adjustment),
        ],
        0i64..500_000,
        0i64..60,
        0usize..2,
    )
        .prop_map(|(kind, cents, day, from)| Op {
            kind,
            cents,
            day,
            from,
        })
}

fn base() -> NaiveDate {
    d(2025, 11, 1)
}

// Straight replay of one account's history, independent of the library.
fn replay(start: Decimal, id: &str, txns: &[Transaction], as_of: NaiveDate) -> Decimal {
    let mut bal = start;
    for t in txns.iter().filter(|t| t.date <= as_of) {
        match t.r#type {
            TransactionType::Income | TransactionType::Adjustment if t.account_id == id => {
                bal += t.amount
            }
            TransactionType::Expense if t.account_id == id => bal -= t.amount,
            TransactionType::Transfer => {
                if t.account_id == id {
                    bal -= t.amount;
                }
                if t.to_account_id.as_deref() == Some(id) {
                    bal += t.amount;
                }
            }
            _ => {}
        }
    }
    bal
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn balance_matches_replay(ops in prop::collection::vec(op(), 0..30), cutoff in 0i64..60) {
        let mut store = seeded_store(base());
        for o in &ops {
            let now = store.now();
            let amount = Decimal::new(o.cents, 2);
            let date = base() + Duration::days(o.day);
            let input = match o.kind {
                TransactionType::Transfer => NewTransaction::transfer(
                    amount, ACCOUNTS[o.from], ACCOUNTS[1 - o.from], date, now,
                ),
                k => NewTransaction::new(k, amount, ACCOUNTS[o.from], date, now),
            };
            store.add_transaction(input).unwrap();
        }
        let as_of = base() + Duration::days(cutoff);
        for acc in store.accounts() {
            prop_assert_eq!(
                store.account_balance(&acc.id, Some(as_of)),
                replay(acc.starting_balance, &acc.id, store.transactions(), as_of)
            );
        }
    }

    #[test]
    fn transfers_never_change_the_total(
        moves in prop::collection::vec((1i64..100_000, 0usize..2, 0i64..30), 1..20)
    ) {
        let mut store = seeded_store(base());
        let before = store.total_balance(Some(base() + Duration::days(30)));
        for (cents, from, day) in moves {
            let now = store.now();
            store
                .add_transaction(NewTransaction::transfer(
                    Decimal::new(cents, 2),
                    ACCOUNTS[from],
                    ACCOUNTS[1 - from],
                    base() + Duration::days(day),
                    now,
                ))
                .unwrap();
        }
        prop_assert_eq!(store.total_balance(Some(base() + Duration::days(30))), before);
    }
}
