//! Work session accounting CLI library.
//!
//! This crate provides the CLI interface for the accounting engine.

mod cli;
pub mod commands;
mod config;

pub use cli::{
    Cli, Commands, LocationAction, ProjectAction, RegulationAction, UserAction,
};
pub use config::Config;
