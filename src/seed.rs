// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! First-run defaults: two accounts, the budget categories, the paycheck and
//! tutoring income configs, and the settings row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;

use crate::clock::Clock;
use crate::db::{LedgerRows, Storage};
use crate::error::Result;
use crate::models::{
    Account, AccountType, Category, IncomeConfig, IncomeSplit, IncomeType, Settings, Theme,
    WeekStart,
};

pub const SETTINGS_ID: &str = "main";

// (id, name, color, monthly, weekly, recurring day)
const CATEGORIES: &[(&str, &str, &str, i64, Option<i64>, Option<u8>)] = &[
    ("rent", "Rent", "#2196F3", 975, None, Some(1)),
    ("electricity", "Electricity", "#009688", 30, None, Some(1)),
    ("internet", "Internet", "#009688", 65, None, Some(1)),
    ("phone", "Phone", "#009688", 55, None, Some(1)),
    ("car_payment", "Car Payment", "#9C27B0", 400, None, Some(1)),
    ("car_insurance", "Car Insurance", "#3F51B5", 90, None, Some(1)),
    ("gas", "Gas", "#FFC107", 173, Some(40), None),
    ("food", "Food", "#4CAF50", 152, Some(35), None),
    ("fun_money", "Fun Money", "#FF9800", 400, None, None),
];

fn cents(v: i64) -> Decimal {
    Decimal::new(v, 2)
}

fn default_accounts(now: DateTime<Utc>) -> Vec<Account> {
    let today = now.date_naive();
    vec![
        Account {
            id: "pnc".into(),
            name: "PNC Spending".into(),
            r#type: AccountType::Checking,
            starting_balance: cents(81063),
            starting_date: today,
            created_at: now,
            updated_at: now,
        },
        Account {
            id: "dcu".into(),
            name: "DCU Savings".into(),
            r#type: AccountType::Savings,
            starting_balance: cents(34742),
            starting_date: today,
            created_at: now,
            updated_at: now,
        },
    ]
}

fn default_categories(now: DateTime<Utc>) -> Vec<Category> {
    CATEGORIES
        .iter()
        .map(|&(id, name, color, monthly, weekly, day)| Category {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            planned_monthly: Decimal::from(monthly),
            planned_weekly: weekly.map(Decimal::from),
            recurring: day.is_some(),
            recurring_day: day,
            account_id: "pnc".into(),
            icon: None,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

fn default_income_configs(now: DateTime<Utc>) -> Vec<IncomeConfig> {
    vec![
        IncomeConfig {
            id: "weekly_paycheck".into(),
            r#type: IncomeType::WeeklyPaycheck,
            amount: Some(cents(115805)),
            min_amount: None,
            max_amount: None,
            day_of_week: Some(3),
            splits: vec![
                IncomeSplit {
                    account_id: "dcu".into(),
                    amount: cents(34742),
                    percentage: Decimal::from(30),
                },
                IncomeSplit {
                    account_id: "pnc".into(),
                    amount: cents(81063),
                    percentage: Decimal::from(70),
                },
            ],
            editable: true,
            created_at: now,
            updated_at: now,
        },
        IncomeConfig {
            id: "tutoring".into(),
            r#type: IncomeType::Tutoring,
            amount: None,
            min_amount: Some(Decimal::from(200)),
            max_amount: Some(Decimal::from(400)),
            day_of_week: None,
            splits: Vec::new(),
            editable: true,
            created_at: now,
            updated_at: now,
        },
    ]
}

pub fn default_settings(now: DateTime<Utc>) -> Settings {
    Settings {
        id: SETTINGS_ID.into(),
        theme: Theme::Dark,
        week_start: WeekStart::Sunday,
        notifications_enabled: true,
        recurring_notification_time: "20:00".into(),
        currency: "USD".into(),
        created_at: now,
        updated_at: now,
    }
}

/// Inserts the defaults unless a settings row already exists. Returns
/// whether anything was written.
pub fn seed_initial_data<S: Storage>(storage: &S, clock: &dyn Clock) -> Result<bool> {
    if storage.select_settings()?.is_some() {
        info!("database already seeded");
        return Ok(false);
    }
    let now = clock.now();
    let accounts = default_accounts(now);
    let categories = default_categories(now);
    let configs = default_income_configs(now);
    let settings = default_settings(now);
    storage.insert_ledger(LedgerRows {
        accounts: &accounts,
        categories: &categories,
        transactions: &[],
        income_configs: Some(&configs),
        settings: Some(&settings),
    })?;
    info!("database seeded");
    Ok(true)
}
