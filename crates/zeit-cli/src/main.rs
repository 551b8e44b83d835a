use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use zeit_cli::commands::{admin, export, save, stats, status, util, week};
use zeit_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(zeit_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = zeit_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Save {
            user,
            start,
            end,
            location,
            project,
        }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            let user = util::parse_user(*user)?;
            save::run(&mut db, user, start, end.as_deref(), *location, *project)?;
        }
        Some(Commands::Status { user, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            status::run(&db, util::parse_user(*user)?, *json)?;
        }
        Some(Commands::Week { user, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            week::run(&db, util::parse_user(*user)?, *json)?;
        }
        Some(Commands::Stats {
            user,
            year,
            month,
            json,
        }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            stats::run(&db, util::parse_user(*user)?, *year, *month, *json)?;
        }
        Some(Commands::Export {
            user,
            year,
            month,
            output,
        }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            export::run(
                &db,
                util::parse_user(*user)?,
                *year,
                *month,
                output.as_deref(),
            )?;
        }
        Some(Commands::User { action }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            admin::user(&db, action)?;
        }
        Some(Commands::Location { action }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            admin::location(&db, action)?;
        }
        Some(Commands::Project { action }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            admin::project(&db, action)?;
        }
        Some(Commands::Regulation { action }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            admin::regulation(&db, action)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
