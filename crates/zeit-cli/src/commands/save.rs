//! Implementation of the `zeit save` command.
//!
//! Submits a session for the acting user. The store upserts against the
//! day's open session, so resubmitting for the same day overwrites rather
//! than duplicating.

use anyhow::{Context, Result};

use zeit_core::SessionDraft;
use zeit_core::types::UserId;
use zeit_db::Database;

pub fn run(
    db: &mut Database,
    user: UserId,
    start: &str,
    end: Option<&str>,
    location: Option<i64>,
    project: Option<i64>,
) -> Result<()> {
    let start = super::util::parse_instant(start).context("invalid --start")?;
    let end = end
        .map(super::util::parse_instant)
        .transpose()
        .context("invalid --end")?;
    let draft = SessionDraft::new(
        start,
        end,
        super::util::parse_location(location)?,
        super::util::parse_project(project)?,
    )
    .context("invalid session")?;

    let saved = db
        .save_session(user, &draft)
        .context("failed to save session")?;

    let state = if saved.is_open() { "open" } else { "closed" };
    println!("saved {state} session {} on {}", saved.id, saved.day());
    Ok(())
}
