//! Implementation of the `zeit stats` command.
//!
//! Monthly statistics use raw durations, not regulation-adjusted ones; a
//! month without closed sessions reports "no data" rather than zeros.

use anyhow::{Context, Result, bail};

use zeit_core::aggregate::{month_window, monthly_averages};
use zeit_core::types::UserId;
use zeit_db::Database;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn run(db: &Database, user: UserId, year: i32, month: u32, json: bool) -> Result<()> {
    db.require_user(user)?;
    let Some((start, end)) = month_window(year, month) else {
        bail!("invalid month: {year}-{month}");
    };

    let sessions = db
        .sessions_in_window(user, start, end)
        .context("failed to load month sessions")?;

    match monthly_averages(&sessions) {
        Some(averages) if json => {
            println!("{}", serde_json::to_string_pretty(&averages)?);
        }
        Some(averages) => {
            println!("statistics for {year}-{month:02}:");
            println!("  average start: {:.2}", averages.average_start_time);
            println!("  average end:   {:.2}", averages.average_end_time);
            for entry in &averages.weekday_averages {
                println!(
                    "  {}: {:.2} h",
                    WEEKDAYS[usize::from(entry.day_of_week) % 7],
                    entry.average_hours
                );
            }
        }
        None if json => println!("null"),
        None => println!("no data for {year}-{month:02}"),
    }
    Ok(())
}
