//! Implementation of the `zeit status` command.

use anyhow::{Context, Result};
use chrono::Utc;

use zeit_core::types::UserId;
use zeit_db::Database;

pub fn run(db: &Database, user: UserId, json: bool) -> Result<()> {
    db.require_user(user)?;
    let today = Utc::now().date_naive();
    let session = db
        .open_session_on(user, today)
        .context("failed to query open session")?;

    match session {
        Some(session) if json => {
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        Some(session) => {
            println!(
                "open session {} since {} (user {})",
                session.id,
                session.start.format("%H:%M"),
                session.user_id
            );
        }
        None if json => println!("null"),
        None => println!("no open session for {today}"),
    }
    Ok(())
}
