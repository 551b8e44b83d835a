//! Break-time regulation table and resolver.
//!
//! A regulation maps a minimum worked-duration threshold (hours) to a
//! mandatory break deduction (minutes). Resolution picks the regulation
//! with the largest threshold not exceeding the raw duration; the
//! deduction is subtracted to produce the legally-adjusted duration.

use serde::{Deserialize, Serialize};

use crate::types::RegulationId;

/// A single break-time rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regulation {
    pub id: RegulationId,
    /// Threshold in hours at and above which this rule applies.
    pub working_hours: u32,
    /// Mandatory break deduction in minutes.
    pub break_minutes: u32,
}

/// Ordered lookup structure over a set of regulations.
///
/// Reference data: built once from the store, never mutated during
/// accounting operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegulationTable {
    regulations: Vec<Regulation>,
}

impl RegulationTable {
    /// Builds a table from an unordered set of regulations.
    #[must_use]
    pub fn new(mut regulations: Vec<Regulation>) -> Self {
        regulations.sort_by_key(|r| (r.working_hours, r.break_minutes));
        Self { regulations }
    }

    /// Returns true when no regulations are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regulations.is_empty()
    }

    /// The regulation applicable to a raw duration, if any.
    ///
    /// Thresholds are inclusive: a duration exactly equal to a threshold
    /// selects that regulation. Among qualifying rules the largest
    /// threshold wins; equal thresholds are broken by the smaller break
    /// deduction.
    #[must_use]
    pub fn applicable(&self, duration_hours: f64) -> Option<&Regulation> {
        self.regulations
            .iter()
            .filter(|r| f64::from(r.working_hours) <= duration_hours)
            .max_by(|a, b| {
                a.working_hours
                    .cmp(&b.working_hours)
                    .then_with(|| b.break_minutes.cmp(&a.break_minutes))
            })
    }

    /// Adjusted duration: raw hours minus the applicable break deduction.
    ///
    /// No deduction applies below the smallest threshold or with an empty
    /// table. The result is not clamped; a misconfigured table may drive
    /// it negative, which is surfaced rather than masked.
    #[must_use]
    pub fn resolve(&self, duration_hours: f64) -> f64 {
        match self.applicable(duration_hours) {
            Some(regulation) => {
                let adjusted = duration_hours - f64::from(regulation.break_minutes) / 60.0;
                if adjusted < 0.0 {
                    tracing::warn!(
                        regulation = regulation.id.get(),
                        duration_hours,
                        adjusted,
                        "regulation deduction exceeds session duration"
                    );
                }
                adjusted
            }
            None => duration_hours,
        }
    }
}
