//! Shared helpers for command implementations.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDateTime, Utc};

use zeit_core::types::{LocationId, ProjectId, UserId};

/// Parses a timestamp argument.
///
/// Accepts RFC 3339 (offsets are converted to UTC) or a bare
/// `YYYY-MM-DDTHH:MM[:SS]`, which is interpreted as UTC.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(anyhow!("unrecognized timestamp: {raw}"))
}

/// Validates the acting user ID argument.
pub fn parse_user(raw: i64) -> Result<UserId> {
    UserId::new(raw).context("invalid user ID")
}

/// Validates an optional location ID argument.
pub fn parse_location(raw: Option<i64>) -> Result<Option<LocationId>> {
    raw.map(LocationId::new)
        .transpose()
        .context("invalid location ID")
}

/// Validates an optional project ID argument.
pub fn parse_project(raw: Option<i64>) -> Result<Option<ProjectId>> {
    raw.map(ProjectId::new)
        .transpose()
        .context("invalid project ID")
}
