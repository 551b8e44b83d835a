//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Work session accounting.
///
/// Tracks work sessions per user and derives weekly worked hours net of
/// mandatory breaks, monthly statistics, and per-session CSV exports.
#[derive(Debug, Parser)]
#[command(name = "zeit", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Save today's session for a user (creates or overwrites the open session).
    Save {
        /// Acting user ID.
        #[arg(long)]
        user: i64,

        /// Session start (RFC 3339 or `YYYY-MM-DDTHH:MM`, UTC).
        #[arg(long)]
        start: String,

        /// Session end; omit to leave the session open.
        #[arg(long)]
        end: Option<String>,

        /// Location ID.
        #[arg(long)]
        location: Option<i64>,

        /// Project ID.
        #[arg(long)]
        project: Option<i64>,
    },

    /// Show the open session for the current UTC day.
    Status {
        /// Acting user ID.
        #[arg(long)]
        user: i64,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Weekly worked hours (Monday to Monday, UTC) against the weekly target.
    Week {
        /// Acting user ID.
        #[arg(long)]
        user: i64,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Monthly statistics: average start/end times and per-weekday durations.
    Stats {
        /// Acting user ID.
        #[arg(long)]
        user: i64,

        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Export a month of sessions as CSV.
    Export {
        /// Acting user ID.
        #[arg(long)]
        user: i64,

        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,

        /// Directory to write `WorkSessions-{year}-{month}.csv` into;
        /// prints CSV to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Manage users.
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage a user's locations.
    Location {
        #[command(subcommand)]
        action: LocationAction,
    },

    /// Manage a user's projects.
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Manage break regulations.
    Regulation {
        #[command(subcommand)]
        action: RegulationAction,
    },
}

/// User administration.
#[derive(Debug, Subcommand)]
pub enum UserAction {
    /// Register a user.
    Add {
        #[arg(long)]
        username: String,

        /// Weekly working-hours target.
        #[arg(long)]
        weekly_hours: u32,
    },
    /// List all users.
    List,
}

/// Location administration.
#[derive(Debug, Subcommand)]
pub enum LocationAction {
    /// Add a location for a user.
    Add {
        #[arg(long)]
        user: i64,

        #[arg(long)]
        description: String,
    },
    /// List a user's locations.
    List {
        #[arg(long)]
        user: i64,
    },
}

/// Project administration.
#[derive(Debug, Subcommand)]
pub enum ProjectAction {
    /// Add a project for a user.
    Add {
        #[arg(long)]
        user: i64,

        #[arg(long)]
        name: String,

        #[arg(long)]
        description: Option<String>,
    },
    /// List a user's projects.
    List {
        #[arg(long)]
        user: i64,
    },
}

/// Regulation administration.
#[derive(Debug, Subcommand)]
pub enum RegulationAction {
    /// Add a break regulation.
    Add {
        /// Threshold in hours at and above which the rule applies.
        #[arg(long)]
        working_hours: u32,

        /// Break deduction in minutes.
        #[arg(long)]
        break_minutes: u32,
    },
    /// List all regulations.
    List,
}
