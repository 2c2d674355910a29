// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The in-memory ledger snapshot and the operations that keep it in step
//! with storage.
//!
//! Every mutation persists first and touches memory only once storage has
//! accepted the change. Failures are recorded as the store's error message
//! and returned to the caller; the snapshot is left as it was.

use std::slice;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calc;
use crate::clock::{Clock, SystemClock};
use crate::db::{LedgerRows, Storage, Table};
use crate::error::{Error, Result};
use crate::income;
use crate::models::{
    Account, AccountPatch, Category, CategoryPatch, IncomeConfig, IncomeConfigPatch, IncomeType,
    NewAccount, NewCategory, NewIncomeConfig, NewTransaction, RecurringStatus, Settings,
    SettingsPatch, Transaction, TransactionPatch, TransactionType,
};

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

struct Snapshot {
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
    income_configs: Vec<IncomeConfig>,
    settings: Option<Settings>,
}

pub struct LedgerStore<S: Storage> {
    storage: S,
    clock: Box<dyn Clock>,
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
    income_configs: Vec<IncomeConfig>,
    settings: Option<Settings>,
    is_loading: bool,
    error: Option<String>,
}

pub(crate) fn validate_transaction(t: &Transaction) -> Result<()> {
    if t.amount.is_sign_negative() && !t.amount.is_zero() {
        return Err(Error::InvalidData(format!(
            "amount must be non-negative, got {}",
            t.amount
        )));
    }
    if t.r#type == TransactionType::Transfer {
        match t.to_account_id.as_deref() {
            None => {
                return Err(Error::InvalidData(
                    "transfer requires a destination account".into(),
                ));
            }
            Some(to) if to == t.account_id => {
                return Err(Error::InvalidData(
                    "transfer source and destination must differ".into(),
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_category(c: &Category) -> Result<()> {
    if c.planned_monthly.is_sign_negative() && !c.planned_monthly.is_zero() {
        return Err(Error::InvalidData("planned monthly must be >= 0".into()));
    }
    match (c.recurring, c.recurring_day) {
        (true, Some(day)) if (1..=31).contains(&day) => Ok(()),
        (true, _) => Err(Error::InvalidData(
            "recurring categories need a recurring day between 1 and 31".into(),
        )),
        (false, Some(_)) => Err(Error::InvalidData(
            "recurring day is only valid on recurring categories".into(),
        )),
        (false, None) => Ok(()),
    }
}

fn validate_income_config(c: &IncomeConfig) -> Result<()> {
    if let Some(d) = c.day_of_week {
        crate::dates::weekday_from_index(d)?;
    }
    if !c.splits.is_empty() {
        income::validate_splits(&c.splits)?;
    }
    Ok(())
}

impl<S: Storage> LedgerStore<S> {
    pub fn new(storage: S, clock: Box<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            accounts: Vec::new(),
            transactions: Vec::new(),
            categories: Vec::new(),
            income_configs: Vec::new(),
            settings: None,
            is_loading: false,
            error: None,
        }
    }

    pub fn with_system_clock(storage: S) -> Self {
        Self::new(storage, Box::new(SystemClock))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Most recent first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn income_configs(&self) -> &[IncomeConfig] {
        &self.income_configs
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn income_config_of_type(&self, kind: IncomeType) -> Option<&IncomeConfig> {
        self.income_configs.iter().find(|c| c.r#type == kind)
    }

    /// Records a failure in `error` (or clears it on success) and hands `res` back.
    pub(crate) fn track<T>(&mut self, op: &'static str, res: Result<T>) -> Result<T> {
        match res {
            Ok(v) => {
                self.error = None;
                Ok(v)
            }
            Err(e) => {
                warn!(op, error = %e, "ledger operation failed");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn fetch_all(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            accounts: self.storage.select_accounts()?,
            transactions: self.storage.select_transactions()?,
            categories: self.storage.select_categories()?,
            income_configs: self.storage.select_income_configs()?,
            settings: self.storage.select_settings()?,
        })
    }

    /// Replaces every collection with what storage holds. On failure the
    /// previous collections are kept.
    pub fn load(&mut self) -> Result<()> {
        self.is_loading = true;
        let res = self.fetch_all();
        self.is_loading = false;
        let snap = self.track("load", res)?;
        info!(
            accounts = snap.accounts.len(),
            transactions = snap.transactions.len(),
            categories = snap.categories.len(),
            "ledger loaded"
        );
        self.accounts = snap.accounts;
        self.transactions = snap.transactions;
        self.categories = snap.categories;
        self.income_configs = snap.income_configs;
        self.settings = snap.settings;
        Ok(())
    }

    // Accounts

    pub fn add_account(&mut self, input: NewAccount) -> Result<Account> {
        let now = self.now();
        let account = Account {
            id: new_id(),
            name: input.name,
            r#type: input.r#type,
            starting_balance: input.starting_balance,
            starting_date: input.starting_date,
            created_at: now,
            updated_at: now,
        };
        let res = self.storage.insert_accounts(slice::from_ref(&account));
        self.track("add_account", res)?;
        debug!(id = %account.id, "account added");
        self.accounts.push(account.clone());
        Ok(account)
    }

    pub fn update_account(&mut self, id: &str, patch: AccountPatch) -> Result<Account> {
        let now = self.now();
        let res = match self.accounts.iter().position(|a| a.id == id) {
            None => Err(Error::NotFound(format!("account '{}'", id))),
            Some(idx) => {
                let mut next = self.accounts[idx].clone();
                patch.apply(&mut next, now);
                self.storage.update_account(&next).map(|_| (idx, next))
            }
        };
        let (idx, next) = self.track("update_account", res)?;
        self.accounts[idx] = next.clone();
        Ok(next)
    }

    pub fn delete_account(&mut self, id: &str) -> Result<()> {
        let res = self.storage.delete(Table::Accounts, Some(id));
        self.track("delete_account", res)?;
        self.accounts.retain(|a| a.id != id);
        Ok(())
    }

    // Transactions

    pub fn add_transaction(&mut self, input: NewTransaction) -> Result<Transaction> {
        let now = self.now();
        let txn = Transaction {
            id: new_id(),
            amount: input.amount,
            r#type: input.r#type,
            category_id: input.category_id,
            account_id: input.account_id,
            to_account_id: input.to_account_id,
            date: input.date,
            timestamp: input.timestamp,
            note: input.note,
            created_at: now,
            updated_at: now,
        };
        let res = validate_transaction(&txn)
            .and_then(|_| self.storage.insert_transactions(slice::from_ref(&txn)));
        self.track("add_transaction", res)?;
        debug!(id = %txn.id, kind = %txn.r#type, amount = %txn.amount, "transaction added");
        self.transactions.insert(0, txn.clone());
        Ok(txn)
    }

    pub fn update_transaction(&mut self, id: &str, patch: TransactionPatch) -> Result<Transaction> {
        let now = self.now();
        let res = match self.transactions.iter().position(|t| t.id == id) {
            None => Err(Error::NotFound(format!("transaction '{}'", id))),
            Some(idx) => {
                let mut next = self.transactions[idx].clone();
                patch.apply(&mut next, now);
                validate_transaction(&next)
                    .and_then(|_| self.storage.update_transaction(&next))
                    .map(|_| (idx, next))
            }
        };
        let (idx, next) = self.track("update_transaction", res)?;
        self.transactions[idx] = next.clone();
        Ok(next)
    }

    pub fn delete_transaction(&mut self, id: &str) -> Result<()> {
        let res = self.storage.delete(Table::Transactions, Some(id));
        self.track("delete_transaction", res)?;
        self.transactions.retain(|t| t.id != id);
        Ok(())
    }

    // Categories

    pub fn add_category(&mut self, input: NewCategory) -> Result<Category> {
        let now = self.now();
        let cat = Category {
            id: new_id(),
            name: input.name,
            color: input.color,
            planned_monthly: input.planned_monthly,
            planned_weekly: input.planned_weekly,
            recurring: input.recurring,
            recurring_day: input.recurring_day,
            account_id: input.account_id,
            icon: input.icon,
            created_at: now,
            updated_at: now,
        };
        let res = validate_category(&cat)
            .and_then(|_| self.storage.insert_categories(slice::from_ref(&cat)));
        self.track("add_category", res)?;
        self.categories.push(cat.clone());
        Ok(cat)
    }

    pub fn update_category(&mut self, id: &str, patch: CategoryPatch) -> Result<Category> {
        let now = self.now();
        let res = match self.categories.iter().position(|c| c.id == id) {
            None => Err(Error::NotFound(format!("category '{}'", id))),
            Some(idx) => {
                let mut next = self.categories[idx].clone();
                patch.apply(&mut next, now);
                validate_category(&next)
                    .and_then(|_| self.storage.update_category(&next))
                    .map(|_| (idx, next))
            }
        };
        let (idx, next) = self.track("update_category", res)?;
        self.categories[idx] = next.clone();
        Ok(next)
    }

    /// Transactions in the category keep existing, uncategorized.
    pub fn delete_category(&mut self, id: &str) -> Result<()> {
        let res = self.storage.delete(Table::Categories, Some(id));
        self.track("delete_category", res)?;
        self.categories.retain(|c| c.id != id);
        for t in self.transactions.iter_mut() {
            if t.category_id.as_deref() == Some(id) {
                t.category_id = None;
            }
        }
        Ok(())
    }

    // Income configs

    pub fn add_income_config(&mut self, input: NewIncomeConfig) -> Result<IncomeConfig> {
        let now = self.now();
        let cfg = IncomeConfig {
            id: new_id(),
            r#type: input.r#type,
            amount: input.amount,
            min_amount: input.min_amount,
            max_amount: input.max_amount,
            day_of_week: input.day_of_week,
            splits: input.splits,
            editable: input.editable,
            created_at: now,
            updated_at: now,
        };
        let res = validate_income_config(&cfg)
            .and_then(|_| self.storage.insert_income_configs(slice::from_ref(&cfg)));
        self.track("add_income_config", res)?;
        self.income_configs.push(cfg.clone());
        Ok(cfg)
    }

    pub fn update_income_config(
        &mut self,
        id: &str,
        patch: IncomeConfigPatch,
    ) -> Result<IncomeConfig> {
        let now = self.now();
        let res = match self.income_configs.iter().position(|c| c.id == id) {
            None => Err(Error::NotFound(format!("income config '{}'", id))),
            Some(idx) => {
                let mut next = self.income_configs[idx].clone();
                patch.apply(&mut next, now);
                validate_income_config(&next)
                    .and_then(|_| self.storage.update_income_config(&next))
                    .map(|_| (idx, next))
            }
        };
        let (idx, next) = self.track("update_income_config", res)?;
        self.income_configs[idx] = next.clone();
        Ok(next)
    }

    pub fn delete_income_config(&mut self, id: &str) -> Result<()> {
        let res = self.storage.delete(Table::IncomeConfigs, Some(id));
        self.track("delete_income_config", res)?;
        self.income_configs.retain(|c| c.id != id);
        Ok(())
    }

    // Settings

    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<Settings> {
        let now = self.now();
        let res = match &self.settings {
            None => Err(Error::SettingsNotInitialized),
            Some(current) => {
                let mut next = current.clone();
                patch.apply(&mut next, now);
                self.storage.update_settings(&next).map(|_| next)
            }
        };
        let next = self.track("update_settings", res)?;
        self.settings = Some(next.clone());
        Ok(next)
    }

    // Recurring statuses are read on demand, not held in the snapshot.

    pub fn recurring_statuses(&mut self, month: &str) -> Result<Vec<RecurringStatus>> {
        let res = self.storage.select_recurring_statuses(month);
        self.track("recurring_statuses", res)
    }

    pub fn upsert_recurring_status(&mut self, status: &RecurringStatus) -> Result<()> {
        let res = self.storage.upsert_recurring_status(status);
        self.track("upsert_recurring_status", res)
    }

    /// Deletes every transaction and recurring status. Accounts, categories,
    /// income configs and settings survive.
    pub fn clear_all_data(&mut self) -> Result<()> {
        let res = self
            .storage
            .delete(Table::Transactions, None)
            .and_then(|n| {
                self.storage
                    .delete(Table::RecurringStatuses, None)
                    .map(|m| (n, m))
            });
        let (txns, statuses) = self.track("clear_all_data", res)?;
        info!(transactions = txns, statuses, "ledger data cleared");
        self.transactions.clear();
        Ok(())
    }

    /// Swaps the stored ledger for `rows` in one storage transaction, then
    /// reloads.
    pub fn replace_ledger(&mut self, rows: LedgerRows<'_>) -> Result<()> {
        let res = self.storage.replace_ledger(rows);
        self.track("replace_ledger", res)?;
        self.load()
    }

    // Queries

    /// Balance on `as_of` (today when `None`), counting rows dated on or
    /// before that day. Unknown accounts are worth 0.
    pub fn account_balance(&self, account_id: &str, as_of: Option<NaiveDate>) -> Decimal {
        let as_of = as_of.unwrap_or_else(|| self.today());
        match self.account(account_id) {
            Some(acc) => calc::account_balance(acc, &self.transactions, as_of),
            None => Decimal::ZERO,
        }
    }

    pub fn total_balance(&self, as_of: Option<NaiveDate>) -> Decimal {
        let as_of = as_of.unwrap_or_else(|| self.today());
        self.accounts
            .iter()
            .map(|a| calc::account_balance(a, &self.transactions, as_of))
            .sum()
    }

    pub fn transactions_for_date(&self, date: NaiveDate) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.date == date)
            .cloned()
            .collect()
    }

    /// Inclusive on both ends.
    pub fn transactions_for_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.date >= start && t.date <= end)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db::Database;
    use crate::models::AccountType;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn store() -> LedgerStore<Database> {
        let mut db = Database::in_memory();
        db.init().unwrap();
        LedgerStore::new(db, Box::new(FixedClock::on(d(2025, 11, 7))))
    }

    fn checking(store: &mut LedgerStore<Database>, balance: Decimal) -> Account {
        store
            .add_account(NewAccount {
                name: "Checking".into(),
                r#type: AccountType::Checking,
                starting_balance: balance,
                starting_date: d(2025, 1, 1),
            })
            .unwrap()
    }

    #[test]
    fn add_transaction_prepends_and_balance_uses_inclusive_cutoff() {
        let mut s = store();
        let acc = checking(&mut s, dec!(100));
        let now = s.now();
        s.add_transaction(
            NewTransaction::new(TransactionType::Expense, dec!(30), &acc.id, d(2025, 11, 7), now),
        )
        .unwrap();
        let later = s
            .add_transaction(NewTransaction::new(
                TransactionType::Income,
                dec!(5),
                &acc.id,
                d(2025, 11, 8),
                now,
            ))
            .unwrap();
        assert_eq!(s.transactions()[0].id, later.id);
        assert_eq!(s.account_balance(&acc.id, None), dec!(70));
        assert_eq!(s.account_balance(&acc.id, Some(d(2025, 11, 8))), dec!(75));
        assert_eq!(s.account_balance("nope", None), Decimal::ZERO);
    }

    #[test]
    fn transfer_to_same_account_is_rejected_and_recorded() {
        let mut s = store();
        let acc = checking(&mut s, dec!(100));
        let now = s.now();
        let err = s
            .add_transaction(NewTransaction::transfer(
                dec!(10),
                &acc.id,
                &acc.id,
                d(2025, 11, 7),
                now,
            ))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
        assert!(s.error().is_some());
        assert!(s.transactions().is_empty());
    }

    #[test]
    fn successful_operation_clears_error() {
        let mut s = store();
        assert!(s.update_settings(SettingsPatch::default()).is_err());
        assert_eq!(s.error(), Some("Settings not initialized"));
        checking(&mut s, dec!(1));
        assert_eq!(s.error(), None);
    }

    #[test]
    fn delete_category_uncategorizes_its_transactions() {
        let mut s = store();
        let acc = checking(&mut s, dec!(0));
        let cat = s
            .add_category(NewCategory {
                name: "Food".into(),
                color: "#4CAF50".into(),
                planned_monthly: dec!(152),
                planned_weekly: Some(dec!(35)),
                recurring: false,
                recurring_day: None,
                account_id: acc.id.clone(),
                icon: None,
            })
            .unwrap();
        let now = s.now();
        s.add_transaction(
            NewTransaction::new(TransactionType::Expense, dec!(12), &acc.id, d(2025, 11, 7), now)
                .category(&cat.id),
        )
        .unwrap();
        s.delete_category(&cat.id).unwrap();
        assert!(s.category(&cat.id).is_none());
        assert_eq!(s.transactions()[0].category_id, None);
        s.load().unwrap();
        assert_eq!(s.transactions()[0].category_id, None);
    }

    #[test]
    fn recurring_category_requires_day() {
        let mut s = store();
        let acc = checking(&mut s, dec!(0));
        let err = s
            .add_category(NewCategory {
                name: "Rent".into(),
                color: "#2196F3".into(),
                planned_monthly: dec!(975),
                planned_weekly: None,
                recurring: true,
                recurring_day: None,
                account_id: acc.id,
                icon: None,
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
        assert!(s.categories().is_empty());
    }
}
