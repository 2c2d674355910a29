// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure balance and analytics arithmetic over snapshot collections.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::dates::{days_in_range, month_boundaries, month_key};
use crate::models::{
    Account, BudgetProgress, Category, CategorySpending, DailyTotal, FlowTotals,
    MonthlyAnalytics, Transaction, TransactionType, WeeklyBreakdown,
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Net of a set of rows: income and adjustments add, expenses subtract,
/// transfers are neutral.
pub fn daily_total(transactions: &[Transaction]) -> Decimal {
    transactions.iter().fold(Decimal::ZERO, |total, t| match t.r#type {
        TransactionType::Income | TransactionType::Adjustment => total + t.amount,
        TransactionType::Expense => total - t.amount,
        TransactionType::Transfer => total,
    })
}

fn sum_of_type(transactions: &[Transaction], kind: TransactionType) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.r#type == kind)
        .map(|t| t.amount)
        .sum()
}

pub fn income_total(transactions: &[Transaction]) -> Decimal {
    sum_of_type(transactions, TransactionType::Income)
}

pub fn expense_total(transactions: &[Transaction]) -> Decimal {
    sum_of_type(transactions, TransactionType::Expense)
}

pub fn category_spending(transactions: &[Transaction], category_id: &str) -> Decimal {
    transactions
        .iter()
        .filter(|t| {
            t.r#type == TransactionType::Expense && t.category_id.as_deref() == Some(category_id)
        })
        .map(|t| t.amount)
        .sum()
}

fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole > Decimal::ZERO {
        part / whole * HUNDRED
    } else {
        Decimal::ZERO
    }
}

pub fn category_spending_breakdown(
    transactions: &[Transaction],
    categories: &[Category],
) -> Vec<CategorySpending> {
    categories
        .iter()
        .map(|c| {
            let actual = category_spending(transactions, &c.id);
            CategorySpending {
                category_id: c.id.clone(),
                planned: c.planned_monthly,
                actual,
                percentage: percent_of(actual, c.planned_monthly),
            }
        })
        .collect()
}

/// Signed effect of one row on `account_id`. A transfer debits its source
/// and credits its destination; the two checks are independent.
pub fn transaction_effect(txn: &Transaction, account_id: &str) -> Decimal {
    let mut effect = Decimal::ZERO;
    if txn.account_id == account_id {
        match txn.r#type {
            TransactionType::Income | TransactionType::Adjustment => effect += txn.amount,
            TransactionType::Expense => effect -= txn.amount,
            TransactionType::Transfer => {
                if txn.to_account_id.is_some() {
                    effect -= txn.amount;
                }
            }
        }
    }
    if txn.r#type == TransactionType::Transfer && txn.to_account_id.as_deref() == Some(account_id)
    {
        effect += txn.amount;
    }
    effect
}

/// Starting balance plus every row dated on or before `as_of`.
pub fn account_balance(account: &Account, transactions: &[Transaction], as_of: NaiveDate) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.date <= as_of)
        .fold(account.starting_balance, |bal, t| {
            bal + transaction_effect(t, &account.id)
        })
}

fn in_range(t: &Transaction, start: NaiveDate, end: NaiveDate) -> bool {
    t.date >= start && t.date <= end
}

pub fn weekly_breakdown(
    transactions: &[Transaction],
    accounts: &[Account],
    start: NaiveDate,
    end: NaiveDate,
) -> WeeklyBreakdown {
    let week: Vec<Transaction> = transactions
        .iter()
        .filter(|t| in_range(t, start, end))
        .cloned()
        .collect();

    let mut starting_balance = BTreeMap::new();
    let mut ending_balance = BTreeMap::new();
    for account in accounts {
        let opening = transactions
            .iter()
            .filter(|t| t.date < start)
            .fold(account.starting_balance, |bal, t| {
                bal + transaction_effect(t, &account.id)
            });
        let closing = week
            .iter()
            .fold(opening, |bal, t| bal + transaction_effect(t, &account.id));
        starting_balance.insert(account.id.clone(), opening);
        ending_balance.insert(account.id.clone(), closing);
    }

    let mut income = FlowTotals {
        total: income_total(&week),
        ..FlowTotals::default()
    };
    let mut expenses = FlowTotals {
        total: expense_total(&week),
        ..FlowTotals::default()
    };
    for t in &week {
        let Some(cat) = t.category_id.as_ref() else {
            continue;
        };
        let bucket = match t.r#type {
            TransactionType::Income => &mut income.by_category,
            TransactionType::Expense => &mut expenses.by_category,
            _ => continue,
        };
        *bucket.entry(cat.clone()).or_insert(Decimal::ZERO) += t.amount;
    }

    let total_start: Decimal = starting_balance.values().copied().sum();
    let total_end: Decimal = ending_balance.values().copied().sum();

    WeeklyBreakdown {
        start_date: start,
        end_date: end,
        starting_balance,
        ending_balance,
        income,
        expenses,
        net_change: total_end - total_start,
    }
}

fn budget_progress(
    transactions: &[Transaction],
    category: &Category,
    start: NaiveDate,
    end: NaiveDate,
    budget: Decimal,
) -> BudgetProgress {
    let spent: Decimal = transactions
        .iter()
        .filter(|t| {
            in_range(t, start, end)
                && t.r#type == TransactionType::Expense
                && t.category_id.as_deref() == Some(category.id.as_str())
        })
        .map(|t| t.amount)
        .sum();
    BudgetProgress {
        spent,
        budget,
        percentage: percent_of(spent, budget),
        remaining: budget - spent,
    }
}

/// Progress against `plannedMonthly` for the month containing `month`.
pub fn monthly_budget_progress(
    transactions: &[Transaction],
    category: &Category,
    month: NaiveDate,
) -> BudgetProgress {
    let (start, end) = month_boundaries(month);
    budget_progress(transactions, category, start, end, category.planned_monthly)
}

pub fn weekly_budget_progress(
    transactions: &[Transaction],
    category: &Category,
    start: NaiveDate,
    end: NaiveDate,
) -> BudgetProgress {
    budget_progress(transactions, category, start, end, category.weekly_budget())
}

pub fn savings_rate(income: Decimal, expenses: Decimal) -> Decimal {
    if income.is_zero() {
        return Decimal::ZERO;
    }
    (income - expenses) / income * HUNDRED
}

/// One entry per day of the inclusive range, including empty days.
pub fn daily_totals(transactions: &[Transaction], start: NaiveDate, end: NaiveDate) -> Vec<DailyTotal> {
    days_in_range(start, end)
        .into_iter()
        .map(|date| {
            let day: Vec<Transaction> = transactions
                .iter()
                .filter(|t| t.date == date)
                .cloned()
                .collect();
            let income = income_total(&day);
            let expenses = expense_total(&day);
            DailyTotal {
                date,
                income,
                expenses,
                net: income - expenses,
            }
        })
        .collect()
}

/// Month summary; account balances are taken as of the last day of the month.
pub fn monthly_analytics(
    transactions: &[Transaction],
    accounts: &[Account],
    categories: &[Category],
    month: NaiveDate,
) -> MonthlyAnalytics {
    let (start, end) = month_boundaries(month);
    let in_month: Vec<Transaction> = transactions
        .iter()
        .filter(|t| in_range(t, start, end))
        .cloned()
        .collect();
    let total_income = income_total(&in_month);
    let total_expenses = expense_total(&in_month);
    MonthlyAnalytics {
        month: month_key(start),
        total_income,
        total_expenses,
        savings_rate: savings_rate(total_income, total_expenses),
        category_spending: category_spending_breakdown(&in_month, categories),
        account_balances: accounts
            .iter()
            .map(|a| (a.id.clone(), account_balance(a, transactions, end)))
            .collect(),
    }
}

/// US-dollar rendering: two decimals, thousands separators, leading minus.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = format!("{:.2}", rounded.abs());
    let (whole, frac) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{}", if negative { "-" } else { "" }, grouped, frac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ts() -> DateTime<Utc> {
        "2025-11-07T12:00:00Z".parse().unwrap()
    }

    fn txn(
        id: &str,
        amount: Decimal,
        kind: TransactionType,
        cat: Option<&str>,
        acct: &str,
        date: &str,
    ) -> Transaction {
        Transaction {
            id: id.into(),
            amount,
            r#type: kind,
            category_id: cat.map(Into::into),
            account_id: acct.into(),
            to_account_id: None,
            date: d(date),
            timestamp: ts(),
            note: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn account(id: &str, start: Decimal) -> Account {
        Account {
            id: id.into(),
            name: id.to_uppercase(),
            r#type: crate::models::AccountType::Checking,
            starting_balance: start,
            starting_date: d("2025-11-01"),
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn category(id: &str, monthly: Decimal, weekly: Option<Decimal>) -> Category {
        Category {
            id: id.into(),
            name: id.into(),
            color: "#000000".into(),
            planned_monthly: monthly,
            planned_weekly: weekly,
            recurring: false,
            recurring_day: None,
            account_id: "pnc".into(),
            icon: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn week_fixture() -> Vec<Transaction> {
        use TransactionType::*;
        vec![
            txn("1", dec!(1000), Income, Some("paycheck"), "pnc", "2025-11-07"),
            txn("2", dec!(50), Expense, Some("food"), "pnc", "2025-11-07"),
            txn("3", dec!(30), Expense, Some("gas"), "pnc", "2025-11-07"),
            txn("4", dec!(200), Income, Some("tutoring"), "dcu", "2025-11-08"),
        ]
    }

    #[test]
    fn totals_by_type() {
        let t = week_fixture();
        assert_eq!(daily_total(&t[..3]), dec!(920));
        assert_eq!(income_total(&t), dec!(1200));
        assert_eq!(expense_total(&t), dec!(80));
    }

    #[test]
    fn transfers_do_not_move_daily_total() {
        let mut t = txn("t", dec!(100), TransactionType::Transfer, None, "pnc", "2025-11-07");
        t.to_account_id = Some("dcu".into());
        let adj = txn("a", dec!(5), TransactionType::Adjustment, None, "pnc", "2025-11-07");
        assert_eq!(daily_total(&[t, adj]), dec!(5));
    }

    #[test]
    fn category_spending_ignores_income() {
        use TransactionType::*;
        let t = vec![
            txn("1", dec!(20), Expense, Some("food"), "pnc", "2025-11-07"),
            txn("2", dec!(99), Income, Some("food"), "pnc", "2025-11-07"),
        ];
        assert_eq!(category_spending(&t, "food"), dec!(20));
    }

    #[test]
    fn breakdown_zero_plan_is_zero_percent() {
        let t = week_fixture();
        let cats = vec![
            category("food", dec!(100), None),
            category("gas", dec!(0), None),
        ];
        let b = category_spending_breakdown(&t, &cats);
        assert_eq!(b[0].percentage, dec!(50));
        assert_eq!(b[1].actual, dec!(30));
        assert_eq!(b[1].percentage, Decimal::ZERO);
    }

    #[test]
    fn weekly_breakdown_scenario() {
        let accounts = vec![account("pnc", dec!(0)), account("dcu", dec!(0))];
        let b = weekly_breakdown(&week_fixture(), &accounts, d("2025-11-07"), d("2025-11-08"));
        assert_eq!(b.income.total, dec!(1200));
        assert_eq!(b.expenses.total, dec!(80));
        assert_eq!(b.net_change, dec!(1120));
        assert_eq!(b.expenses.by_category["food"], dec!(50));
        assert_eq!(b.ending_balance["dcu"], dec!(200));
    }

    #[test]
    fn weekly_breakdown_opening_uses_prior_rows_only() {
        use TransactionType::*;
        let mut rows = week_fixture();
        rows.push(txn("0", dec!(10), Expense, Some("food"), "pnc", "2025-11-01"));
        let accounts = vec![account("pnc", dec!(100))];
        let b = weekly_breakdown(&rows, &accounts, d("2025-11-07"), d("2025-11-08"));
        assert_eq!(b.starting_balance["pnc"], dec!(90));
        assert_eq!(b.ending_balance["pnc"], dec!(1010));
        assert_eq!(b.net_change, dec!(920));
    }

    #[test]
    fn overspending_is_not_clamped() {
        let cat = category("food", dec!(100), None);
        let t = vec![txn("1", dec!(150), TransactionType::Expense, Some("food"), "pnc", "2025-11-12")];
        let p = monthly_budget_progress(&t, &cat, d("2025-11-01"));
        assert_eq!(
            p,
            BudgetProgress {
                spent: dec!(150),
                budget: dec!(100),
                percentage: dec!(150),
                remaining: dec!(-50),
            }
        );
        let outside = monthly_budget_progress(&t, &cat, d("2025-10-15"));
        assert_eq!(outside.spent, Decimal::ZERO);
    }

    #[test]
    fn weekly_progress_uses_explicit_or_derived_budget() {
        let t = vec![txn("1", dec!(20), TransactionType::Expense, Some("food"), "pnc", "2025-11-07")];
        let explicit = category("food", dec!(152), Some(dec!(40)));
        let p = weekly_budget_progress(&t, &explicit, d("2025-11-02"), d("2025-11-08"));
        assert_eq!(p.percentage, dec!(50));
        let derived = category("food", dec!(433), None);
        let p = weekly_budget_progress(&t, &derived, d("2025-11-02"), d("2025-11-08"));
        assert_eq!(p.budget, dec!(100));
        assert_eq!(p.remaining, dec!(80));
    }

    #[test]
    fn savings_rate_edges() {
        assert_eq!(savings_rate(dec!(0), dec!(50)), Decimal::ZERO);
        assert_eq!(savings_rate(dec!(1000), dec!(250)), dec!(75));
        assert_eq!(savings_rate(dec!(100), dec!(300)), dec!(-200));
    }

    #[test]
    fn currency_formatting() {
        assert_eq!(format_currency(dec!(-1234.56)), "-$1,234.56");
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_currency(dec!(999.5)), "$999.50");
        assert_eq!(format_currency(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn daily_totals_cover_every_day() {
        let days = daily_totals(&week_fixture(), d("2025-11-06"), d("2025-11-08"));
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].net, Decimal::ZERO);
        assert_eq!(days[1].net, dec!(920));
        assert_eq!(days[2].income, dec!(200));
    }

    #[test]
    fn monthly_analytics_summary() {
        let accounts = vec![account("pnc", dec!(100))];
        let cats = vec![category("food", dec!(100), None)];
        let m = monthly_analytics(&week_fixture(), &accounts, &cats, d("2025-11-20"));
        assert_eq!(m.month, "2025-11");
        assert_eq!(m.total_income, dec!(1200));
        assert_eq!(m.savings_rate, (dec!(1120) / dec!(1200)) * dec!(100));
        assert_eq!(m.category_spending[0].actual, dec!(50));
        assert_eq!(m.account_balances["pnc"], dec!(1020));
    }
}
