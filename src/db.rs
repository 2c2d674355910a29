// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{
    Account, Category, IncomeConfig, IncomeSplit, RecurringStatus, Settings, Transaction,
};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Pennywise", "pennywise"));

/// Environment override for the database location.
pub const DB_PATH_ENV: &str = "PENNYWISE_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(DB_PATH_ENV) {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p.trim()));
        }
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .ok_or_else(|| Error::NotFound("platform-specific data dir".into()))?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir)?;
    Ok(data_dir.join("pennywise.sqlite"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Accounts,
    Categories,
    Transactions,
    IncomeConfigs,
    IncomeSplits,
    RecurringStatuses,
    Settings,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Accounts => "accounts",
            Table::Categories => "categories",
            Table::Transactions => "transactions",
            Table::IncomeConfigs => "income_configs",
            Table::IncomeSplits => "income_splits",
            Table::RecurringStatuses => "recurring_statuses",
            Table::Settings => "settings",
        }
    }
}

/// A batch of ledger rows for `Storage::insert_ledger` and
/// `Storage::replace_ledger`. On replace, `income_configs`/`settings` of
/// `None` keep the stored rows.
#[derive(Debug, Clone, Copy)]
pub struct LedgerRows<'a> {
    pub accounts: &'a [Account],
    pub categories: &'a [Category],
    pub transactions: &'a [Transaction],
    pub income_configs: Option<&'a [IncomeConfig]>,
    pub settings: Option<&'a Settings>,
}

/// Row-level persistence used by the store, the seeder and import/export.
///
/// Updates address rows by id and fail with `Error::NotFound` when nothing
/// matched. `delete` with `None` clears the whole table.
pub trait Storage {
    fn create_schema(&self) -> Result<()>;

    fn select_accounts(&self) -> Result<Vec<Account>>;
    /// Most recent `timestamp` first.
    fn select_transactions(&self) -> Result<Vec<Transaction>>;
    fn select_categories(&self) -> Result<Vec<Category>>;
    fn select_income_configs(&self) -> Result<Vec<IncomeConfig>>;
    fn select_settings(&self) -> Result<Option<Settings>>;
    fn select_recurring_statuses(&self, month: &str) -> Result<Vec<RecurringStatus>>;

    fn insert_accounts(&self, rows: &[Account]) -> Result<()>;
    fn insert_transactions(&self, rows: &[Transaction]) -> Result<()>;
    fn insert_categories(&self, rows: &[Category]) -> Result<()>;
    /// Inserts each config together with its splits.
    fn insert_income_configs(&self, rows: &[IncomeConfig]) -> Result<()>;
    fn insert_settings(&self, row: &Settings) -> Result<()>;

    fn update_account(&self, row: &Account) -> Result<()>;
    fn update_transaction(&self, row: &Transaction) -> Result<()>;
    fn update_category(&self, row: &Category) -> Result<()>;
    /// Replaces the config row and its full split list.
    fn update_income_config(&self, row: &IncomeConfig) -> Result<()>;
    fn update_settings(&self, row: &Settings) -> Result<()>;
    /// Keyed by (month, category_id).
    fn upsert_recurring_status(&self, row: &RecurringStatus) -> Result<()>;

    fn delete(&self, table: Table, id: Option<&str>) -> Result<usize>;

    /// Inserts every collection in `rows` in one transaction. Nothing is
    /// written if any insert fails.
    fn insert_ledger(&self, rows: LedgerRows<'_>) -> Result<()>;

    /// Clears transactions, recurring statuses, categories and accounts (and
    /// income configs when replacements are supplied), then inserts `rows`,
    /// as one unit. Kept income splits that point at an account no longer
    /// present are dropped.
    fn replace_ledger(&self, rows: LedgerRows<'_>) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Ready,
    Failed,
}

#[derive(Debug, Clone)]
enum Target {
    File(PathBuf),
    Memory,
}

enum Handle {
    Uninitialized,
    Ready(Connection),
    Failed(String),
}

/// SQLite-backed storage. Must be `init()`ed before use; every operation on
/// an uninitialized or failed handle returns `Error::NotInitialized`.
pub struct Database {
    target: Target,
    handle: Handle,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            target: Target::File(path.into()),
            handle: Handle::Uninitialized,
        }
    }

    /// Uninitialized handle on a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            target: Target::Memory,
            handle: Handle::Uninitialized,
        }
    }

    /// Opens the default database location and initializes it.
    pub fn open_or_init() -> Result<Self> {
        let mut db = Self::new(db_path()?);
        db.init()?;
        Ok(db)
    }

    pub fn state(&self) -> ConnectionState {
        match self.handle {
            Handle::Uninitialized => ConnectionState::Uninitialized,
            Handle::Ready(_) => ConnectionState::Ready,
            Handle::Failed(_) => ConnectionState::Failed,
        }
    }

    pub fn last_failure(&self) -> Option<&str> {
        match &self.handle {
            Handle::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn path(&self) -> Option<&std::path::Path> {
        match &self.target {
            Target::File(p) => Some(p),
            Target::Memory => None,
        }
    }

    /// Opens the connection and creates the schema. A no-op when ready.
    pub fn init(&mut self) -> Result<()> {
        if matches!(self.handle, Handle::Ready(_)) {
            return Ok(());
        }
        let opened = match &self.target {
            Target::File(p) => {
                info!(path = %p.display(), "opening database");
                Connection::open(p)
            }
            Target::Memory => Connection::open_in_memory(),
        };
        let conn = match opened {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "database open failed");
                self.handle = Handle::Failed(e.to_string());
                return Err(Error::InitFailed(e.to_string()));
            }
        };
        self.handle = Handle::Ready(conn);
        if let Err(e) = self.create_schema() {
            warn!(error = %e, "schema creation failed");
            self.handle = Handle::Failed(e.to_string());
            return Err(Error::InitFailed(e.to_string()));
        }
        debug!("database ready");
        Ok(())
    }

    /// Drops the connection so a later `init()` starts over.
    pub fn reset(&mut self) {
        self.handle = Handle::Uninitialized;
    }

    pub fn conn(&self) -> Result<&Connection> {
        match &self.handle {
            Handle::Ready(c) => Ok(c),
            _ => Err(Error::NotInitialized),
        }
    }
}

fn ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn conversion_failure(idx: usize, e: impl Display) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.to_string().into())
}

fn parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| conversion_failure(idx, e))
}

fn parsed_opt<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| s.parse::<T>().map_err(|e| conversion_failure(idx, e)))
        .transpose()
}

fn account_from_row(r: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: r.get(0)?,
        name: r.get(1)?,
        r#type: parsed(r, 2)?,
        starting_balance: parsed(r, 3)?,
        starting_date: r.get(4)?,
        created_at: parsed(r, 5)?,
        updated_at: parsed(r, 6)?,
    })
}

fn transaction_from_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        amount: parsed(r, 1)?,
        r#type: parsed(r, 2)?,
        category_id: r.get(3)?,
        account_id: r.get(4)?,
        date: r.get(5)?,
        timestamp: parsed(r, 6)?,
        note: r.get(7)?,
        to_account_id: r.get(8)?,
        created_at: parsed(r, 9)?,
        updated_at: parsed(r, 10)?,
    })
}

fn category_from_row(r: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        name: r.get(1)?,
        color: r.get(2)?,
        planned_monthly: parsed(r, 3)?,
        planned_weekly: parsed_opt(r, 4)?,
        recurring: r.get(5)?,
        recurring_day: r.get(6)?,
        account_id: r.get(7)?,
        icon: r.get(8)?,
        created_at: parsed(r, 9)?,
        updated_at: parsed(r, 10)?,
    })
}

fn income_config_from_row(r: &Row<'_>) -> rusqlite::Result<IncomeConfig> {
    Ok(IncomeConfig {
        id: r.get(0)?,
        r#type: parsed(r, 1)?,
        amount: parsed_opt(r, 2)?,
        min_amount: parsed_opt(r, 3)?,
        max_amount: parsed_opt(r, 4)?,
        day_of_week: r.get(5)?,
        editable: r.get(6)?,
        splits: Vec::new(),
        created_at: parsed(r, 7)?,
        updated_at: parsed(r, 8)?,
    })
}

fn recurring_status_from_row(r: &Row<'_>) -> rusqlite::Result<RecurringStatus> {
    Ok(RecurringStatus {
        id: r.get(0)?,
        month: r.get(1)?,
        category_id: r.get(2)?,
        confirmed: r.get(3)?,
        skipped: r.get(4)?,
        amount: parsed(r, 5)?,
        notification_sent: r.get(6)?,
        created_at: parsed(r, 7)?,
        updated_at: parsed(r, 8)?,
    })
}

fn settings_from_row(r: &Row<'_>) -> rusqlite::Result<Settings> {
    Ok(Settings {
        id: r.get(0)?,
        theme: parsed(r, 1)?,
        week_start: parsed(r, 2)?,
        notifications_enabled: r.get(3)?,
        recurring_notification_time: r.get(4)?,
        currency: r.get(5)?,
        created_at: parsed(r, 6)?,
        updated_at: parsed(r, 7)?,
    })
}

fn expect_one(changed: usize, table: Table, id: &str) -> Result<()> {
    if changed == 0 {
        return Err(Error::NotFound(format!("{} row '{}'", table.name(), id)));
    }
    Ok(())
}

fn insert_accounts_on(conn: &Connection, rows: &[Account]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO accounts(id, name, type, starting_balance, starting_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for a in rows {
        stmt.execute(params![
            a.id,
            a.name,
            a.r#type.as_str(),
            a.starting_balance.to_string(),
            a.starting_date,
            ts(&a.created_at),
            ts(&a.updated_at)
        ])?;
    }
    Ok(())
}

fn insert_categories_on(conn: &Connection, rows: &[Category]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO categories(id, name, color, planned_monthly, planned_weekly, recurring,
             recurring_day, account_id, icon, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;
    for c in rows {
        stmt.execute(params![
            c.id,
            c.name,
            c.color,
            c.planned_monthly.to_string(),
            c.planned_weekly.map(|w| w.to_string()),
            c.recurring,
            c.recurring_day,
            c.account_id,
            c.icon,
            ts(&c.created_at),
            ts(&c.updated_at)
        ])?;
    }
    Ok(())
}

fn insert_transactions_on(conn: &Connection, rows: &[Transaction]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO transactions(id, amount, type, category_id, account_id, date, timestamp,
             note, to_account_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;
    for t in rows {
        stmt.execute(params![
            t.id,
            t.amount.to_string(),
            t.r#type.as_str(),
            t.category_id,
            t.account_id,
            t.date,
            ts(&t.timestamp),
            t.note,
            t.to_account_id,
            ts(&t.created_at),
            ts(&t.updated_at)
        ])?;
    }
    Ok(())
}

fn insert_splits_on(conn: &Connection, cfg: &IncomeConfig) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO income_splits(id, income_config_id, account_id, amount, percentage,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for s in &cfg.splits {
        stmt.execute(params![
            uuid::Uuid::new_v4().to_string(),
            cfg.id,
            s.account_id,
            s.amount.to_string(),
            s.percentage.to_string(),
            ts(&cfg.updated_at),
            ts(&cfg.updated_at)
        ])?;
    }
    Ok(())
}

fn insert_income_configs_on(conn: &Connection, rows: &[IncomeConfig]) -> Result<()> {
    for c in rows {
        conn.execute(
            "INSERT INTO income_configs(id, type, amount, min_amount, max_amount, day_of_week,
                 editable, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                c.id,
                c.r#type.as_str(),
                c.amount.map(|a| a.to_string()),
                c.min_amount.map(|a| a.to_string()),
                c.max_amount.map(|a| a.to_string()),
                c.day_of_week,
                c.editable,
                ts(&c.created_at),
                ts(&c.updated_at)
            ],
        )?;
        insert_splits_on(conn, c)?;
    }
    Ok(())
}

fn insert_settings_on(conn: &Connection, s: &Settings) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(id, theme, week_start, notifications_enabled,
             recurring_notification_time, currency, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            s.id,
            s.theme.as_str(),
            s.week_start.as_str(),
            s.notifications_enabled,
            s.recurring_notification_time,
            s.currency,
            ts(&s.created_at),
            ts(&s.updated_at)
        ],
    )?;
    Ok(())
}

fn upsert_settings_on(conn: &Connection, s: &Settings) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(id, theme, week_start, notifications_enabled,
             recurring_notification_time, currency, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET theme=excluded.theme, week_start=excluded.week_start,
             notifications_enabled=excluded.notifications_enabled,
             recurring_notification_time=excluded.recurring_notification_time,
             currency=excluded.currency, updated_at=excluded.updated_at",
        params![
            s.id,
            s.theme.as_str(),
            s.week_start.as_str(),
            s.notifications_enabled,
            s.recurring_notification_time,
            s.currency,
            ts(&s.created_at),
            ts(&s.updated_at)
        ],
    )?;
    Ok(())
}

impl Storage for Database {
    fn create_schema(&self) -> Result<()> {
        // Parents before children: accounts, categories, then the rows
        // that reference them.
        self.conn()?.execute_batch(
            r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS accounts(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('checking','savings')),
        starting_balance TEXT NOT NULL,
        starting_date TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS categories(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        color TEXT NOT NULL,
        planned_monthly TEXT NOT NULL,
        planned_weekly TEXT,
        recurring INTEGER NOT NULL,
        recurring_day INTEGER CHECK(recurring_day BETWEEN 1 AND 31),
        account_id TEXT NOT NULL,
        icon TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(account_id) REFERENCES accounts(id)
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY,
        amount TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense','transfer','adjustment')),
        category_id TEXT,
        account_id TEXT NOT NULL,
        date TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        note TEXT,
        to_account_id TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(account_id) REFERENCES accounts(id),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL,
        FOREIGN KEY(to_account_id) REFERENCES accounts(id)
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
    CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id);

    CREATE TABLE IF NOT EXISTS income_configs(
        id TEXT PRIMARY KEY,
        type TEXT NOT NULL,
        amount TEXT,
        min_amount TEXT,
        max_amount TEXT,
        day_of_week INTEGER CHECK(day_of_week BETWEEN 0 AND 6),
        editable INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS income_splits(
        id TEXT PRIMARY KEY,
        income_config_id TEXT NOT NULL,
        account_id TEXT NOT NULL,
        amount TEXT NOT NULL,
        percentage TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(income_config_id) REFERENCES income_configs(id),
        FOREIGN KEY(account_id) REFERENCES accounts(id)
    );

    CREATE TABLE IF NOT EXISTS recurring_statuses(
        id TEXT PRIMARY KEY,
        month TEXT NOT NULL,
        category_id TEXT NOT NULL,
        confirmed INTEGER NOT NULL,
        skipped INTEGER NOT NULL,
        amount TEXT NOT NULL,
        notification_sent INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE(month, category_id),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_recurring_month ON recurring_statuses(month);

    CREATE TABLE IF NOT EXISTS settings(
        id TEXT PRIMARY KEY,
        theme TEXT NOT NULL,
        week_start TEXT NOT NULL,
        notifications_enabled INTEGER NOT NULL,
        recurring_notification_time TEXT NOT NULL,
        currency TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    "#,
        )?;
        Ok(())
    }

    fn select_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, type, starting_balance, starting_date, created_at, updated_at
             FROM accounts ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], account_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn select_transactions(&self) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, amount, type, category_id, account_id, date, timestamp, note,
                    to_account_id, created_at, updated_at
             FROM transactions ORDER BY timestamp DESC, rowid DESC",
        )?;
        let rows = stmt.query_map([], transaction_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn select_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, color, planned_monthly, planned_weekly, recurring, recurring_day,
                    account_id, icon, created_at, updated_at
             FROM categories ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], category_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn select_income_configs(&self) -> Result<Vec<IncomeConfig>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, type, amount, min_amount, max_amount, day_of_week, editable,
                    created_at, updated_at
             FROM income_configs ORDER BY rowid",
        )?;
        let mut configs = stmt
            .query_map([], income_config_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut split_stmt = conn.prepare(
            "SELECT account_id, amount, percentage FROM income_splits
             WHERE income_config_id=?1 ORDER BY rowid",
        )?;
        for cfg in configs.iter_mut() {
            let splits = split_stmt.query_map(params![cfg.id], |r| {
                Ok(IncomeSplit {
                    account_id: r.get(0)?,
                    amount: parsed(r, 1)?,
                    percentage: parsed(r, 2)?,
                })
            })?;
            cfg.splits = splits.collect::<rusqlite::Result<Vec<_>>>()?;
        }
        Ok(configs)
    }

    fn select_settings(&self) -> Result<Option<Settings>> {
        let conn = self.conn()?;
        let s = conn
            .query_row(
                "SELECT id, theme, week_start, notifications_enabled, recurring_notification_time,
                        currency, created_at, updated_at
                 FROM settings ORDER BY rowid LIMIT 1",
                [],
                settings_from_row,
            )
            .optional()?;
        Ok(s)
    }

    fn select_recurring_statuses(&self, month: &str) -> Result<Vec<RecurringStatus>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, month, category_id, confirmed, skipped, amount, notification_sent,
                    created_at, updated_at
             FROM recurring_statuses WHERE month=?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![month], recurring_status_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn insert_accounts(&self, rows: &[Account]) -> Result<()> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        insert_accounts_on(&tx, rows)?;
        tx.commit()?;
        Ok(())
    }

    fn insert_transactions(&self, rows: &[Transaction]) -> Result<()> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        insert_transactions_on(&tx, rows)?;
        tx.commit()?;
        Ok(())
    }

    fn insert_categories(&self, rows: &[Category]) -> Result<()> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        insert_categories_on(&tx, rows)?;
        tx.commit()?;
        Ok(())
    }

    fn insert_income_configs(&self, rows: &[IncomeConfig]) -> Result<()> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        insert_income_configs_on(&tx, rows)?;
        tx.commit()?;
        Ok(())
    }

    fn insert_settings(&self, row: &Settings) -> Result<()> {
        insert_settings_on(self.conn()?, row)
    }

    fn update_account(&self, a: &Account) -> Result<()> {
        let n = self.conn()?.execute(
            "UPDATE accounts SET name=?2, type=?3, starting_balance=?4, starting_date=?5,
                 updated_at=?6
             WHERE id=?1",
            params![
                a.id,
                a.name,
                a.r#type.as_str(),
                a.starting_balance.to_string(),
                a.starting_date,
                ts(&a.updated_at)
            ],
        )?;
        expect_one(n, Table::Accounts, &a.id)
    }

    fn update_transaction(&self, t: &Transaction) -> Result<()> {
        let n = self.conn()?.execute(
            "UPDATE transactions SET amount=?2, type=?3, category_id=?4, account_id=?5, date=?6,
                 timestamp=?7, note=?8, to_account_id=?9, updated_at=?10
             WHERE id=?1",
            params![
                t.id,
                t.amount.to_string(),
                t.r#type.as_str(),
                t.category_id,
                t.account_id,
                t.date,
                ts(&t.timestamp),
                t.note,
                t.to_account_id,
                ts(&t.updated_at)
            ],
        )?;
        expect_one(n, Table::Transactions, &t.id)
    }

    fn update_category(&self, c: &Category) -> Result<()> {
        let n = self.conn()?.execute(
            "UPDATE categories SET name=?2, color=?3, planned_monthly=?4, planned_weekly=?5,
                 recurring=?6, recurring_day=?7, account_id=?8, icon=?9, updated_at=?10
             WHERE id=?1",
            params![
                c.id,
                c.name,
                c.color,
                c.planned_monthly.to_string(),
                c.planned_weekly.map(|w| w.to_string()),
                c.recurring,
                c.recurring_day,
                c.account_id,
                c.icon,
                ts(&c.updated_at)
            ],
        )?;
        expect_one(n, Table::Categories, &c.id)
    }

    fn update_income_config(&self, c: &IncomeConfig) -> Result<()> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let n = tx.execute(
            "UPDATE income_configs SET type=?2, amount=?3, min_amount=?4, max_amount=?5,
                 day_of_week=?6, editable=?7, updated_at=?8
             WHERE id=?1",
            params![
                c.id,
                c.r#type.as_str(),
                c.amount.map(|a| a.to_string()),
                c.min_amount.map(|a| a.to_string()),
                c.max_amount.map(|a| a.to_string()),
                c.day_of_week,
                c.editable,
                ts(&c.updated_at)
            ],
        )?;
        expect_one(n, Table::IncomeConfigs, &c.id)?;
        tx.execute(
            "DELETE FROM income_splits WHERE income_config_id=?1",
            params![c.id],
        )?;
        insert_splits_on(&tx, c)?;
        tx.commit()?;
        Ok(())
    }

    fn update_settings(&self, s: &Settings) -> Result<()> {
        let n = self.conn()?.execute(
            "UPDATE settings SET theme=?2, week_start=?3, notifications_enabled=?4,
                 recurring_notification_time=?5, currency=?6, updated_at=?7
             WHERE id=?1",
            params![
                s.id,
                s.theme.as_str(),
                s.week_start.as_str(),
                s.notifications_enabled,
                s.recurring_notification_time,
                s.currency,
                ts(&s.updated_at)
            ],
        )?;
        expect_one(n, Table::Settings, &s.id)
    }

    fn upsert_recurring_status(&self, s: &RecurringStatus) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO recurring_statuses(id, month, category_id, confirmed, skipped, amount,
                 notification_sent, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(month, category_id) DO UPDATE SET confirmed=excluded.confirmed,
                 skipped=excluded.skipped, amount=excluded.amount,
                 notification_sent=excluded.notification_sent, updated_at=excluded.updated_at",
            params![
                s.id,
                s.month,
                s.category_id,
                s.confirmed,
                s.skipped,
                s.amount.to_string(),
                s.notification_sent,
                ts(&s.created_at),
                ts(&s.updated_at)
            ],
        )?;
        Ok(())
    }

    fn delete(&self, table: Table, id: Option<&str>) -> Result<usize> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        // Splits live and die with their config.
        if table == Table::IncomeConfigs {
            match id {
                Some(id) => tx.execute(
                    "DELETE FROM income_splits WHERE income_config_id=?1",
                    params![id],
                )?,
                None => tx.execute("DELETE FROM income_splits", [])?,
            };
        }
        let n = match id {
            Some(id) => tx.execute(
                &format!("DELETE FROM {} WHERE id=?1", table.name()),
                params![id],
            )?,
            None => tx.execute(&format!("DELETE FROM {}", table.name()), [])?,
        };
        tx.commit()?;
        debug!(table = table.name(), rows = n, "deleted");
        Ok(n)
    }

    fn insert_ledger(&self, rows: LedgerRows<'_>) -> Result<()> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        insert_accounts_on(&tx, rows.accounts)?;
        insert_categories_on(&tx, rows.categories)?;
        insert_transactions_on(&tx, rows.transactions)?;
        if let Some(configs) = rows.income_configs {
            insert_income_configs_on(&tx, configs)?;
        }
        if let Some(settings) = rows.settings {
            insert_settings_on(&tx, settings)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn replace_ledger(&self, rows: LedgerRows<'_>) -> Result<()> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        // Reference checks run at commit, once both sides are back in place.
        tx.execute_batch("PRAGMA defer_foreign_keys = ON;")?;
        tx.execute("DELETE FROM transactions", [])?;
        tx.execute("DELETE FROM recurring_statuses", [])?;
        tx.execute("DELETE FROM categories", [])?;
        if rows.income_configs.is_some() {
            tx.execute("DELETE FROM income_splits", [])?;
            tx.execute("DELETE FROM income_configs", [])?;
        }
        tx.execute("DELETE FROM accounts", [])?;

        insert_accounts_on(&tx, rows.accounts)?;
        insert_categories_on(&tx, rows.categories)?;
        insert_transactions_on(&tx, rows.transactions)?;
        match rows.income_configs {
            Some(configs) => insert_income_configs_on(&tx, configs)?,
            None => {
                let pruned = tx.execute(
                    "DELETE FROM income_splits WHERE account_id NOT IN (SELECT id FROM accounts)",
                    [],
                )?;
                if pruned > 0 {
                    warn!(pruned, "dropped income splits for accounts missing from import");
                }
            }
        }
        if let Some(settings) = rows.settings {
            tx.execute("DELETE FROM settings WHERE id != ?1", params![settings.id])?;
            upsert_settings_on(&tx, settings)?;
        }
        tx.commit()?;
        Ok(())
    }
}
