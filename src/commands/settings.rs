// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Storage;
use crate::error::Error;
use crate::models::{SettingsPatch, Theme, WeekStart};
use crate::notify::{self, MemoryNotifier, Notifier};
use crate::store::LedgerStore;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;

/// Works out next month's bill reminder without keeping it anywhere; the
/// CLI has no long-lived notifier to hand it to.
pub fn preview_reminder<S: Storage>(store: &LedgerStore<S>) -> crate::Result<Option<String>> {
    let settings = store.settings().ok_or(Error::SettingsNotInitialized)?;
    let mut notifier = MemoryNotifier::new(true);
    notify::schedule_next_month_reminder(&mut notifier, settings, store.now())?;
    Ok(notifier.list_scheduled().into_iter().next())
}

pub fn handle<S: Storage>(store: &mut LedgerStore<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let s = store.settings().ok_or(Error::SettingsNotInitialized)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), s)? {
                let rows = vec![
                    vec!["theme".into(), s.theme.as_str().into()],
                    vec!["week start".into(), s.week_start.as_str().into()],
                    vec![
                        "notifications".into(),
                        if s.notifications_enabled { "on" } else { "off" }.into(),
                    ],
                    vec!["reminder time".into(), s.recurring_notification_time.clone()],
                    vec!["currency".into(), s.currency.clone()],
                ];
                println!("{}", pretty_table(&["Setting", "Value"], rows));
            }
        }
        Some(("set", sub)) => {
            if let Some(t) = sub.get_one::<String>("time") {
                notify::parse_time(t)?;
            }
            let patch = SettingsPatch {
                theme: sub
                    .get_one::<String>("theme")
                    .map(|s| s.parse::<Theme>())
                    .transpose()?,
                week_start: sub
                    .get_one::<String>("week_start")
                    .map(|s| s.parse::<WeekStart>())
                    .transpose()?,
                notifications_enabled: sub
                    .get_one::<String>("notifications")
                    .map(|s| s == "on"),
                recurring_notification_time: sub.get_one::<String>("time").cloned(),
                currency: sub
                    .get_one::<String>("currency")
                    .map(|c| c.to_uppercase()),
            };
            store.update_settings(patch)?;
            println!("Settings updated");
        }
        Some(("remind", _)) => match preview_reminder(store)? {
            Some(line) => println!("Next reminder (preview, not saved): {}", line),
            None => println!("No reminder due (notifications off or time passed)"),
        },
        _ => {}
    }
    Ok(())
}
