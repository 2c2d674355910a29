// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::Decimal;

use crate::dates;
use crate::db::Storage;
use crate::store::LedgerStore;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    dates::parse_iso_date(s).with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Validates `YYYY-MM` and returns the first day of that month.
pub fn parse_month(s: &str) -> Result<NaiveDate> {
    dates::parse_month(s).with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .trim_start_matches('$')
        .replace(',', "")
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Non-negative amount as entered on the command line.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d.is_sign_negative() && !d.is_zero() {
        return Err(anyhow!("Amount must be positive, got '{}'", s));
    }
    Ok(d)
}

/// Value of an argument clap has already marked required.
pub fn required<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a String> {
    m.get_one::<String>(name)
        .ok_or_else(|| anyhow!("missing required argument '{}'", name))
}

/// Optional date argument, falling back to the store's today.
pub fn date_or_today<S: Storage>(
    m: &clap::ArgMatches,
    name: &str,
    store: &LedgerStore<S>,
) -> Result<NaiveDate> {
    match m.get_one::<String>(name) {
        Some(s) => parse_date(s),
        None => Ok(store.today()),
    }
}

/// Resolves an account by id or, failing that, by case-insensitive name.
pub fn account_id<S: Storage>(store: &LedgerStore<S>, key: &str) -> Result<String> {
    store
        .accounts()
        .iter()
        .find(|a| a.id == key || a.name.eq_ignore_ascii_case(key))
        .map(|a| a.id.clone())
        .with_context(|| format!("Account '{}' not found", key))
}

pub fn category_id<S: Storage>(store: &LedgerStore<S>, key: &str) -> Result<String> {
    store
        .categories()
        .iter()
        .find(|c| c.id == key || c.name.eq_ignore_ascii_case(key))
        .map(|c| c.id.clone())
        .with_context(|| format!("Category '{}' not found", key))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn decimals_tolerate_dollar_sign_and_grouping() {
        assert_eq!(parse_decimal("$1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal(" 12 ").unwrap(), dec!(12));
        assert!(parse_decimal("twelve").is_err());
        assert!(parse_amount("-5").is_err());
    }

    #[test]
    fn month_argument_yields_first_day() {
        assert_eq!(
            parse_month("2025-11").unwrap(),
            NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()
        );
        assert!(parse_month("2025/11").is_err());
    }
}
