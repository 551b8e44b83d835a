//! Data model for users, reference data, and work sessions.
//!
//! Ownership is modelled as one-directional foreign keys (`user_id` on the
//! owned record); back-references are never materialized. Lookups go
//! through the session store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{LocationId, ProjectId, SessionId, UserId, ValidationError};

/// An account that owns locations, projects, and work sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Weekly working-hours target. Display/comparison only, never enforced.
    pub working_hours_weekly: u32,
}

impl User {
    /// Creates a user after validating the username and weekly target.
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        working_hours_weekly: u32,
    ) -> Result<Self, ValidationError> {
        let username = username.into();
        if username.is_empty() {
            return Err(ValidationError::Empty { field: "username" });
        }
        if working_hours_weekly == 0 {
            return Err(ValidationError::ZeroWeeklyTarget);
        }
        Ok(Self {
            id,
            username,
            working_hours_weekly,
        })
    }
}

/// A work location owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub user_id: UserId,
    pub description: String,
}

/// A project owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
}

/// A recorded work period.
///
/// `end == None` means the session is still open. Timestamps are UTC
/// throughout; local display is a boundary concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub location_id: Option<LocationId>,
    pub project_id: Option<ProjectId>,
}

impl WorkSession {
    /// Returns true when the session has no end timestamp.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// The UTC calendar day the session belongs to.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Raw duration in hours, or `None` while the session is open.
    #[must_use]
    pub fn duration_hours(&self) -> Option<f64> {
        self.end
            .map(|end| duration_hours_between(self.start, end))
    }
}

/// A session submission as received from the boundary layer.
///
/// Saving is an upsert keyed by (user, UTC day of `start`, open-ness), so
/// the draft carries no session ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDraft {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub location_id: Option<LocationId>,
    pub project_id: Option<ProjectId>,
}

impl SessionDraft {
    /// Creates a draft, rejecting an end timestamp before the start.
    pub fn new(
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        location_id: Option<LocationId>,
        project_id: Option<ProjectId>,
    ) -> Result<Self, ValidationError> {
        if let Some(end) = end {
            if end < start {
                return Err(ValidationError::EndBeforeStart { start, end });
            }
        }
        Ok(Self {
            start,
            end,
            location_id,
            project_id,
        })
    }

    /// The UTC calendar day the draft targets.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.start.date_naive()
    }
}

/// Elapsed hours between two instants as a fraction.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn duration_hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_seconds() as f64 / 3600.0
}
