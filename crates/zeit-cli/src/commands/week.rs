//! Implementation of the `zeit week` command.
//!
//! Sums regulation-adjusted hours over the current Monday-to-Monday UTC
//! week and pairs the total with the user's configured weekly target.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use zeit_core::aggregate::{WeeklyHours, week_window, weekly_worked_hours};
use zeit_core::types::UserId;
use zeit_db::Database;

pub fn run(db: &Database, user: UserId, json: bool) -> Result<()> {
    let now = Utc::now();
    let weekly = compute(db, user, now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&weekly)?);
    } else {
        let (start, _) = week_window(now);
        println!(
            "week of {}: worked {:.2} h of {} h target",
            start.date_naive(),
            weekly.worked_hours,
            weekly.working_hours_weekly
        );
    }
    Ok(())
}

/// Weekly totals for the week containing `now`.
pub fn compute(db: &Database, user: UserId, now: DateTime<Utc>) -> Result<WeeklyHours> {
    let account = db.require_user(user)?;
    let (start, end) = week_window(now);
    tracing::debug!(%start, %end, user = user.get(), "computing weekly hours");

    let sessions = db
        .closed_sessions_in_window(user, start, end)
        .context("failed to load week sessions")?;
    let table = db.regulation_table()?;

    Ok(WeeklyHours {
        worked_hours: weekly_worked_hours(&sessions, &table),
        working_hours_weekly: account.working_hours_weekly,
    })
}
