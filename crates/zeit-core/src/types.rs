//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// An identifier was zero or negative.
    #[error("{field} must be positive, got {value}")]
    NonPositiveId { field: &'static str, value: i64 },

    /// A session's end timestamp preceded its start.
    #[error("session end {end} is before start {start}")]
    EndBeforeStart {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// The weekly working-hours target was zero.
    #[error("weekly working hours target must be positive")]
    ZeroWeeklyTarget,
}

/// Generates a validated integer ID newtype with common trait implementations.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: i64) -> Result<Self, ValidationError> {
                if id <= 0 {
                    return Err(ValidationError::NonPositiveId {
                        field: $field_name,
                        value: id,
                    });
                }
                Ok(Self(id))
            }

            /// Returns the raw ID value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = ValidationError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// A validated user identifier.
    ///
    /// The authoritative user identity comes from the boundary layer; the
    /// engine only requires it to be a positive integer.
    UserId, "user ID"
);

define_id!(
    /// A validated work session identifier.
    ///
    /// Assigned by the session store on insert; callers never address a
    /// session by ID when saving, only when reading exported rows.
    SessionId, "session ID"
);

define_id!(
    /// A validated location identifier.
    LocationId, "location ID"
);

define_id!(
    /// A validated project identifier.
    ProjectId, "project ID"
);

define_id!(
    /// A validated regulation identifier.
    RegulationId, "regulation ID"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_non_positive() {
        assert!(UserId::new(0).is_err());
        assert!(UserId::new(-3).is_err());
        assert!(UserId::new(1).is_ok());
    }

    #[test]
    fn session_id_roundtrips_raw_value() {
        let id = SessionId::new(42).unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = ProjectId::new(7).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let parsed: ProjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn id_serde_rejects_non_positive() {
        let result: Result<LocationId, _> = serde_json::from_str("0");
        assert!(result.is_err());
        let result: Result<LocationId, _> = serde_json::from_str("-1");
        assert!(result.is_err());
    }

    #[test]
    fn id_display_shows_raw_value() {
        let id = RegulationId::new(3).unwrap();
        assert_eq!(id.to_string(), "3");
    }
}
