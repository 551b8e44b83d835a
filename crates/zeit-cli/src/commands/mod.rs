//! CLI subcommand implementations.

pub mod admin;
pub mod export;
pub mod save;
pub mod stats;
pub mod status;
pub mod util;
pub mod week;
