// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};

/// Source of "now" for audit timestamps and the default balance cutoff.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a given instant. Each call to `now` advances by one
/// millisecond so records created back to back keep a strict timestamp order.
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(at),
        }
    }

    /// Midday UTC on the given date.
    pub fn on(date: NaiveDate) -> Self {
        let at = date
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        Self::new(at)
    }

    pub fn set(&self, at: DateTime<Utc>) {
        if let Ok(mut cur) = self.current.lock() {
            *cur = at;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.current.lock() {
            Ok(mut cur) => {
                let at = *cur;
                *cur = at + chrono::Duration::milliseconds(1);
                at
            }
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_pinned_day_and_advances() {
        let day = NaiveDate::from_ymd_opt(2025, 11, 7).unwrap();
        let clock = FixedClock::on(day);
        let a = clock.now();
        let b = clock.now();
        assert!(b > a);
        assert_eq!(clock.today(), day);
    }
}
