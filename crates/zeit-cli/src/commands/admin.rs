//! Reference data administration: users, locations, projects, regulations.
//!
//! These are thin pass-throughs to the store; the accounting engine only
//! ever reads this data.

use anyhow::{Context, Result};

use zeit_db::Database;

use crate::cli::{LocationAction, ProjectAction, RegulationAction, UserAction};

pub fn user(db: &Database, action: &UserAction) -> Result<()> {
    match action {
        UserAction::Add {
            username,
            weekly_hours,
        } => {
            let user = db
                .insert_user(username, *weekly_hours)
                .context("failed to add user")?;
            println!(
                "added user {} ({}, {} h/week)",
                user.id, user.username, user.working_hours_weekly
            );
        }
        UserAction::List => {
            for user in db.list_users()? {
                println!(
                    "{}\t{}\t{} h/week",
                    user.id, user.username, user.working_hours_weekly
                );
            }
        }
    }
    Ok(())
}

pub fn location(db: &Database, action: &LocationAction) -> Result<()> {
    match action {
        LocationAction::Add { user, description } => {
            let user = super::util::parse_user(*user)?;
            let location = db
                .insert_location(user, description)
                .context("failed to add location")?;
            println!("added location {} ({})", location.id, location.description);
        }
        LocationAction::List { user } => {
            let user = super::util::parse_user(*user)?;
            for location in db.list_locations(user)? {
                println!("{}\t{}", location.id, location.description);
            }
        }
    }
    Ok(())
}

pub fn project(db: &Database, action: &ProjectAction) -> Result<()> {
    match action {
        ProjectAction::Add {
            user,
            name,
            description,
        } => {
            let user = super::util::parse_user(*user)?;
            let project = db
                .insert_project(user, name, description.as_deref())
                .context("failed to add project")?;
            println!("added project {} ({})", project.id, project.name);
        }
        ProjectAction::List { user } => {
            let user = super::util::parse_user(*user)?;
            for project in db.list_projects(user)? {
                println!(
                    "{}\t{}\t{}",
                    project.id,
                    project.name,
                    project.description.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

pub fn regulation(db: &Database, action: &RegulationAction) -> Result<()> {
    match action {
        RegulationAction::Add {
            working_hours,
            break_minutes,
        } => {
            let regulation = db
                .insert_regulation(*working_hours, *break_minutes)
                .context("failed to add regulation")?;
            println!(
                "added regulation {}: >= {} h deducts {} min",
                regulation.id, regulation.working_hours, regulation.break_minutes
            );
        }
        RegulationAction::List => {
            for regulation in db.list_regulations()? {
                println!(
                    "{}\t>= {} h\t-{} min",
                    regulation.id, regulation.working_hours, regulation.break_minutes
                );
            }
        }
    }
    Ok(())
}
