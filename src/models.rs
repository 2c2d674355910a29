// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
    Adjustment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeType {
    WeeklyPaycheck,
    Tutoring,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
        }
    }
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
            TransactionType::Transfer => "transfer",
            TransactionType::Adjustment => "adjustment",
        }
    }
}

impl IncomeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeType::WeeklyPaycheck => "weekly_paycheck",
            IncomeType::Tutoring => "tutoring",
            IncomeType::Other => "other",
        }
    }
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl WeekStart {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekStart::Sunday => "sunday",
            WeekStart::Monday => "monday",
        }
    }

    pub fn weekday(&self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            WeekStart::Sunday => WeekStart::Monday,
            WeekStart::Monday => WeekStart::Sunday,
        }
    }
}

impl FromStr for AccountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "checking" => Ok(AccountType::Checking),
            "savings" => Ok(AccountType::Savings),
            other => Err(Error::InvalidData(format!("unknown account type '{}'", other))),
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            "transfer" => Ok(TransactionType::Transfer),
            "adjustment" => Ok(TransactionType::Adjustment),
            other => Err(Error::InvalidData(format!(
                "unknown transaction type '{}'",
                other
            ))),
        }
    }
}

impl FromStr for IncomeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly_paycheck" => Ok(IncomeType::WeeklyPaycheck),
            "tutoring" => Ok(IncomeType::Tutoring),
            "other" => Ok(IncomeType::Other),
            other => Err(Error::InvalidData(format!("unknown income type '{}'", other))),
        }
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(Error::InvalidData(format!("unknown theme '{}'", other))),
        }
    }
}

impl FromStr for WeekStart {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sunday" => Ok(WeekStart::Sunday),
            "monday" => Ok(WeekStart::Monday),
            other => Err(Error::InvalidData(format!("unknown week start '{}'", other))),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub r#type: AccountType,
    pub starting_balance: Decimal,
    pub starting_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal, // non-negative magnitude
    pub r#type: TransactionType,
    #[serde(default)]
    pub category_id: Option<String>,
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<String>,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    pub planned_monthly: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_weekly: Option<Decimal>,
    pub recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_day: Option<u8>, // 1-31
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Average number of weeks per month used when a category has no explicit
/// weekly budget.
pub const WEEKS_PER_MONTH: Decimal = Decimal::from_parts(433, 0, 0, false, 2);

impl Category {
    pub fn weekly_budget(&self) -> Decimal {
        self.planned_weekly
            .unwrap_or_else(|| self.planned_monthly / WEEKS_PER_MONTH)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSplit {
    pub account_id: String,
    pub amount: Decimal,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeConfig {
    pub id: String,
    pub r#type: IncomeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>, // 0 = Sunday .. 6 = Saturday
    #[serde(default)]
    pub splits: Vec<IncomeSplit>,
    pub editable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringStatus {
    pub id: String,
    pub month: String, // YYYY-MM
    pub category_id: String,
    pub confirmed: bool,
    pub skipped: bool,
    pub amount: Decimal,
    pub notification_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub id: String,
    pub theme: Theme,
    pub week_start: WeekStart,
    pub notifications_enabled: bool,
    pub recurring_notification_time: String, // HH:mm
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Creation inputs: everything except identity and audit fields.

#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub name: String,
    pub r#type: AccountType,
    pub starting_balance: Decimal,
    pub starting_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub r#type: TransactionType,
    pub category_id: Option<String>,
    pub account_id: String,
    pub to_account_id: Option<String>,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub note: Option<String>,
}

impl NewTransaction {
    pub fn new(
        r#type: TransactionType,
        amount: Decimal,
        account_id: impl Into<String>,
        date: NaiveDate,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            amount,
            r#type,
            category_id: None,
            account_id: account_id.into(),
            to_account_id: None,
            date,
            timestamp,
            note: None,
        }
    }

    pub fn transfer(
        amount: Decimal,
        from: impl Into<String>,
        to: impl Into<String>,
        date: NaiveDate,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(TransactionType::Transfer, amount, from, date, timestamp).to_account(to)
    }

    pub fn category(mut self, id: impl Into<String>) -> Self {
        self.category_id = Some(id.into());
        self
    }

    pub fn to_account(mut self, id: impl Into<String>) -> Self {
        self.to_account_id = Some(id.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
    pub planned_monthly: Decimal,
    pub planned_weekly: Option<Decimal>,
    pub recurring: bool,
    pub recurring_day: Option<u8>,
    pub account_id: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewIncomeConfig {
    pub r#type: IncomeType,
    pub amount: Option<Decimal>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub day_of_week: Option<u8>,
    pub splits: Vec<IncomeSplit>,
    pub editable: bool,
}

// Typed partial updates. `None` leaves a field untouched; for nullable
// fields `Some(None)` clears the value.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub r#type: Option<AccountType>,
    pub starting_balance: Option<Decimal>,
    pub starting_date: Option<NaiveDate>,
}

impl AccountPatch {
    pub fn apply(&self, acc: &mut Account, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            acc.name = name.clone();
        }
        if let Some(t) = self.r#type {
            acc.r#type = t;
        }
        if let Some(b) = self.starting_balance {
            acc.starting_balance = b;
        }
        if let Some(d) = self.starting_date {
            acc.starting_date = d;
        }
        acc.updated_at = now;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub amount: Option<Decimal>,
    pub r#type: Option<TransactionType>,
    pub category_id: Option<Option<String>>,
    pub account_id: Option<String>,
    pub to_account_id: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub timestamp: Option<DateTime<Utc>>,
    pub note: Option<Option<String>>,
}

impl TransactionPatch {
    pub fn apply(&self, txn: &mut Transaction, now: DateTime<Utc>) {
        if let Some(a) = self.amount {
            txn.amount = a;
        }
        if let Some(t) = self.r#type {
            txn.r#type = t;
        }
        if let Some(c) = &self.category_id {
            txn.category_id = c.clone();
        }
        if let Some(a) = &self.account_id {
            txn.account_id = a.clone();
        }
        if let Some(to) = &self.to_account_id {
            txn.to_account_id = to.clone();
        }
        if let Some(d) = self.date {
            txn.date = d;
        }
        if let Some(ts) = self.timestamp {
            txn.timestamp = ts;
        }
        if let Some(n) = &self.note {
            txn.note = n.clone();
        }
        txn.updated_at = now;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub planned_monthly: Option<Decimal>,
    pub planned_weekly: Option<Option<Decimal>>,
    pub recurring: Option<bool>,
    pub recurring_day: Option<Option<u8>>,
    pub account_id: Option<String>,
    pub icon: Option<Option<String>>,
}

impl CategoryPatch {
    /// Sets the monthly budget and re-derives the weekly one from it.
    pub fn budget(monthly: Decimal) -> Self {
        Self {
            planned_monthly: Some(monthly),
            planned_weekly: Some(Some((monthly / WEEKS_PER_MONTH).round_dp(2))),
            ..Self::default()
        }
    }

    pub fn apply(&self, cat: &mut Category, now: DateTime<Utc>) {
        if let Some(n) = &self.name {
            cat.name = n.clone();
        }
        if let Some(c) = &self.color {
            cat.color = c.clone();
        }
        if let Some(m) = self.planned_monthly {
            cat.planned_monthly = m;
        }
        if let Some(w) = self.planned_weekly {
            cat.planned_weekly = w;
        }
        if let Some(r) = self.recurring {
            cat.recurring = r;
        }
        if let Some(d) = self.recurring_day {
            cat.recurring_day = d;
        }
        if let Some(a) = &self.account_id {
            cat.account_id = a.clone();
        }
        if let Some(i) = &self.icon {
            cat.icon = i.clone();
        }
        cat.updated_at = now;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomeConfigPatch {
    pub amount: Option<Option<Decimal>>,
    pub min_amount: Option<Option<Decimal>>,
    pub max_amount: Option<Option<Decimal>>,
    pub day_of_week: Option<Option<u8>>,
    pub editable: Option<bool>,
    pub splits: Option<Vec<IncomeSplit>>,
}

impl IncomeConfigPatch {
    pub fn apply(&self, cfg: &mut IncomeConfig, now: DateTime<Utc>) {
        if let Some(a) = self.amount {
            cfg.amount = a;
        }
        if let Some(a) = self.min_amount {
            cfg.min_amount = a;
        }
        if let Some(a) = self.max_amount {
            cfg.max_amount = a;
        }
        if let Some(d) = self.day_of_week {
            cfg.day_of_week = d;
        }
        if let Some(e) = self.editable {
            cfg.editable = e;
        }
        if let Some(s) = &self.splits {
            cfg.splits = s.clone();
        }
        cfg.updated_at = now;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub week_start: Option<WeekStart>,
    pub notifications_enabled: Option<bool>,
    pub recurring_notification_time: Option<String>,
    pub currency: Option<String>,
}

impl SettingsPatch {
    pub fn apply(&self, s: &mut Settings, now: DateTime<Utc>) {
        if let Some(t) = self.theme {
            s.theme = t;
        }
        if let Some(w) = self.week_start {
            s.week_start = w;
        }
        if let Some(n) = self.notifications_enabled {
            s.notifications_enabled = n;
        }
        if let Some(t) = &self.recurring_notification_time {
            s.recurring_notification_time = t.clone();
        }
        if let Some(c) = &self.currency {
            s.currency = c.clone();
        }
        s.updated_at = now;
    }
}

// Derived views.

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpending {
    pub category_id: String,
    pub planned: Decimal,
    pub actual: Decimal,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetProgress {
    pub spent: Decimal,
    pub budget: Decimal,
    pub percentage: Decimal,
    pub remaining: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowTotals {
    pub total: Decimal,
    pub by_category: std::collections::BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyBreakdown {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub starting_balance: std::collections::BTreeMap<String, Decimal>,
    pub ending_balance: std::collections::BTreeMap<String, Decimal>,
    pub income: FlowTotals,
    pub expenses: FlowTotals,
    pub net_change: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAnalytics {
    pub month: String,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub savings_rate: Decimal,
    pub category_spending: Vec<CategorySpending>,
    pub account_balances: std::collections::BTreeMap<String, Decimal>,
}
