// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveTime, Utc};
use tracing::{debug, info};

use crate::dates::{next_month_key, parse_month};
use crate::error::{Error, Result};
use crate::models::Settings;

/// Delivery side of monthly bill reminders.
pub trait Notifier {
    fn request_permission(&mut self) -> bool;

    /// Schedules a reminder for `month` (YYYY-MM) at `at`; returns a handle
    /// when the platform accepted it.
    fn schedule_monthly(&mut self, month: &str, at: DateTime<Utc>) -> Option<String>;

    fn list_scheduled(&self) -> Vec<String>;
}

pub fn parse_time(time: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|_| Error::InvalidData(format!("Invalid time '{}', expected HH:mm", time)))
}

/// The 1st of `month` at `time` (HH:mm).
pub fn reminder_instant(month: &str, time: &str) -> Result<DateTime<Utc>> {
    let first = parse_month(month)?;
    Ok(first.and_time(parse_time(time)?).and_utc())
}

/// Asks for next month's reminder when notifications are on. Reminders that
/// would fire in the past are not scheduled.
pub fn schedule_next_month_reminder<N: Notifier>(
    notifier: &mut N,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Result<Option<String>> {
    if !settings.notifications_enabled {
        debug!("notifications disabled, nothing scheduled");
        return Ok(None);
    }
    let month = next_month_key(now.date_naive());
    let at = reminder_instant(&month, &settings.recurring_notification_time)?;
    if at < now {
        debug!(%at, "reminder instant already passed");
        return Ok(None);
    }
    if !notifier.request_permission() {
        info!("notification permission denied");
        return Ok(None);
    }
    let handle = notifier.schedule_monthly(&month, at);
    if let Some(h) = &handle {
        info!(%month, %at, handle = %h, "bill reminder scheduled");
    }
    Ok(handle)
}

/// Keeps scheduled reminders in memory. Used by the CLI and tests.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    pub permitted: bool,
    scheduled: Vec<(String, DateTime<Utc>)>,
}

impl MemoryNotifier {
    pub fn new(permitted: bool) -> Self {
        Self {
            permitted,
            scheduled: Vec::new(),
        }
    }
}

impl Notifier for MemoryNotifier {
    fn request_permission(&mut self) -> bool {
        self.permitted
    }

    fn schedule_monthly(&mut self, month: &str, at: DateTime<Utc>) -> Option<String> {
        let handle = format!("reminder-{}", month);
        self.scheduled.retain(|(h, _)| *h != handle);
        self.scheduled.push((handle.clone(), at));
        Some(handle)
    }

    fn list_scheduled(&self) -> Vec<String> {
        self.scheduled
            .iter()
            .map(|(h, at)| format!("{} at {}", h, at.to_rfc3339()))
            .collect()
    }
}
