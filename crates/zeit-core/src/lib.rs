//! Core domain logic for the work session accounting engine.
//!
//! This crate contains the fundamental types and logic for:
//! - Data model: users, locations, projects, work sessions
//! - Regulation resolution: break deductions against a threshold table
//! - Aggregation: weekly worked hours and monthly statistics
//! - Export projection: flat adjusted rows for tabular serialization

pub mod aggregate;
pub mod export;
pub mod model;
pub mod regulation;
pub mod types;

pub use aggregate::{
    MonthlyAverages, WeekdayAverage, WeeklyHours, month_window, monthly_averages, round2,
    week_window, weekly_worked_hours,
};
pub use export::{ExportRow, project_month};
pub use model::{Location, Project, SessionDraft, User, WorkSession};
pub use regulation::{Regulation, RegulationTable};
pub use types::{LocationId, ProjectId, RegulationId, SessionId, UserId, ValidationError};
