// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use std::cell::Cell;

use chrono::NaiveDate;
use pennywise::clock::FixedClock;
use pennywise::db::{Database, LedgerRows, Storage, Table};
use pennywise::models::{
    Account, Category, IncomeConfig, RecurringStatus, Settings, Transaction,
};
use pennywise::seed::seed_initial_data;
use pennywise::store::LedgerStore;
use pennywise::{Error, Result};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn database() -> Database {
    let mut db = Database::in_memory();
    db.init().unwrap();
    db
}

/// Fresh store over a seeded in-memory database, "today" pinned to `today`.
pub fn seeded_store(today: NaiveDate) -> LedgerStore<Database> {
    let clock = FixedClock::on(today);
    let db = database();
    seed_initial_data(&db, &clock).unwrap();
    let mut store = LedgerStore::new(db, Box::new(clock));
    store.load().unwrap();
    store
}

pub fn empty_store(today: NaiveDate) -> LedgerStore<Database> {
    LedgerStore::new(database(), Box::new(FixedClock::on(today)))
}

/// Storage that delegates to SQLite until told to fail.
pub struct Flaky {
    pub inner: Database,
    pub fail: Cell<bool>,
    /// When set, inserts succeed this many more times and then fail.
    pub inserts_left: Cell<Option<usize>>,
}

impl Flaky {
    pub fn new() -> Self {
        Self {
            inner: database(),
            fail: Cell::new(false),
            inserts_left: Cell::new(None),
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail.get() {
            return Err(Error::Io(std::io::Error::other("disk unplugged")));
        }
        Ok(())
    }

    fn check_insert(&self) -> Result<()> {
        self.check()?;
        match self.inserts_left.get() {
            Some(0) => Err(Error::Io(std::io::Error::other("disk full"))),
            Some(n) => {
                self.inserts_left.set(Some(n - 1));
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Storage for Flaky {
    fn create_schema(&self) -> Result<()> {
        self.check()?;
        self.inner.create_schema()
    }
    fn select_accounts(&self) -> Result<Vec<Account>> {
        self.check()?;
        self.inner.select_accounts()
    }
    fn select_transactions(&self) -> Result<Vec<Transaction>> {
        self.check()?;
        self.inner.select_transactions()
    }
    fn select_categories(&self) -> Result<Vec<Category>> {
        self.check()?;
        self.inner.select_categories()
    }
    fn select_income_configs(&self) -> Result<Vec<IncomeConfig>> {
        self.check()?;
        self.inner.select_income_configs()
    }
    fn select_settings(&self) -> Result<Option<Settings>> {
        self.check()?;
        self.inner.select_settings()
    }
    fn select_recurring_statuses(&self, month: &str) -> Result<Vec<RecurringStatus>> {
        self.check()?;
        self.inner.select_recurring_statuses(month)
    }
    fn insert_accounts(&self, rows: &[Account]) -> Result<()> {
        self.check_insert()?;
        self.inner.insert_accounts(rows)
    }
    fn insert_transactions(&self, rows: &[Transaction]) -> Result<()> {
        self.check_insert()?;
        self.inner.insert_transactions(rows)
    }
    fn insert_categories(&self, rows: &[Category]) -> Result<()> {
        self.check_insert()?;
        self.inner.insert_categories(rows)
    }
    fn insert_income_configs(&self, rows: &[IncomeConfig]) -> Result<()> {
        self.check_insert()?;
        self.inner.insert_income_configs(rows)
    }
    fn insert_settings(&self, row: &Settings) -> Result<()> {
        self.check_insert()?;
        self.inner.insert_settings(row)
    }
    fn update_account(&self, row: &Account) -> Result<()> {
        self.check()?;
        self.inner.update_account(row)
    }
    fn update_transaction(&self, row: &Transaction) -> Result<()> {
        self.check()?;
        self.inner.update_transaction(row)
    }
    fn update_category(&self, row: &Category) -> Result<()> {
        self.check()?;
        self.inner.update_category(row)
    }
    fn update_income_config(&self, row: &IncomeConfig) -> Result<()> {
        self.check()?;
        self.inner.update_income_config(row)
    }
    fn update_settings(&self, row: &Settings) -> Result<()> {
        self.check()?;
        self.inner.update_settings(row)
    }
    fn upsert_recurring_status(&self, row: &RecurringStatus) -> Result<()> {
        self.check()?;
        self.inner.upsert_recurring_status(row)
    }
    fn delete(&self, table: Table, id: Option<&str>) -> Result<usize> {
        self.check()?;
        self.inner.delete(table, id)
    }
    fn insert_ledger(&self, rows: LedgerRows<'_>) -> Result<()> {
        self.check_insert()?;
        self.inner.insert_ledger(rows)
    }
    fn replace_ledger(&self, rows: LedgerRows<'_>) -> Result<()> {
        self.check()?;
        self.inner.replace_ledger(rows)
    }
}

pub fn flaky_seeded_store(today: NaiveDate) -> LedgerStore<Flaky> {
    let clock = FixedClock::on(today);
    let flaky = Flaky::new();
    seed_initial_data(&flaky, &clock).unwrap();
    let mut store = LedgerStore::new(flaky, Box::new(clock));
    store.load().unwrap();
    store
}
