// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar arithmetic: week and month boundaries, ISO round trips and
//! weekday stepping.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

use crate::error::{Error, Result};
use crate::models::WeekStart;

pub const ISO_DATE: &str = "%Y-%m-%d";

/// The 7-day window containing `date`, starting on `week_start`.
pub fn week_boundaries(date: NaiveDate, week_start: WeekStart) -> (NaiveDate, NaiveDate) {
    let week = date.week(week_start.weekday());
    (week.first_day(), week.last_day())
}

pub fn month_boundaries(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).unwrap_or(date);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    (start, end)
}

/// Inclusive, ordered sequence of days. Empty when `start > end`.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

pub fn days_in_week(date: NaiveDate, week_start: WeekStart) -> Vec<NaiveDate> {
    let (start, end) = week_boundaries(date, week_start);
    days_in_range(start, end)
}

pub fn days_in_month(date: NaiveDate) -> Vec<NaiveDate> {
    let (start, end) = month_boundaries(date);
    days_in_range(start, end)
}

pub fn to_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

/// Parses `yyyy-MM-dd`, also accepting a full RFC 3339 instant whose time of
/// day is dropped.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, ISO_DATE) {
        return Ok(d);
    }
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| Error::InvalidData(format!("Invalid date '{}', expected YYYY-MM-DD", s)))
}

/// `YYYY-MM` key for the month containing `date`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// First day of a `YYYY-MM` month.
pub fn parse_month(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), ISO_DATE)
        .map_err(|_| Error::InvalidData(format!("Invalid month '{}', expected YYYY-MM", s)))
}

pub fn next_month_key(date: NaiveDate) -> String {
    let (start, _) = month_boundaries(date);
    month_key(start.checked_add_months(Months::new(1)).unwrap_or(start))
}

pub fn next_week(date: NaiveDate) -> NaiveDate {
    date + Duration::weeks(1)
}

pub fn previous_week(date: NaiveDate) -> NaiveDate {
    date - Duration::weeks(1)
}

/// Weekday from the 0 = Sunday .. 6 = Saturday convention.
pub fn weekday_from_index(index: u8) -> Result<Weekday> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        _ => Err(Error::InvalidData(format!(
            "day of week {} out of range 0 (Sunday) to 6 (Saturday)",
            index
        ))),
    }
}

pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Next date falling on `weekday`, always strictly after `from`: a `from`
/// already on that weekday yields the same weekday one week later.
pub fn next_occurrence_of_weekday(weekday: Weekday, from: NaiveDate) -> NaiveDate {
    let current = from.weekday().num_days_from_sunday() as i64;
    let target = weekday.num_days_from_sunday() as i64;
    let ahead = (target - current).rem_euclid(7);
    from + Duration::days(if ahead == 0 { 7 } else { ahead })
}

pub fn format_date_display(date: NaiveDate) -> String {
    date.format("%A, %b %-d, %Y").to_string()
}

pub fn format_month_year(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

pub fn format_week_range(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {}", start.format("%b %-d"), end.format("%b %-d, %Y"))
}
