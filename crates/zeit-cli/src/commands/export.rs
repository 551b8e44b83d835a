//! Implementation of the `zeit export` command.
//!
//! Projects a month of sessions into adjusted rows and renders them as
//! CSV, either to stdout or to `WorkSessions-{year}-{month}.csv` in the
//! requested directory.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, SecondsFormat, Utc};

use zeit_core::aggregate::month_window;
use zeit_core::export::{ExportRow, project_month};
use zeit_core::types::UserId;
use zeit_db::Database;

/// Filename convention for monthly exports.
fn export_filename(year: i32, month: u32) -> String {
    format!("WorkSessions-{year}-{month}.csv")
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn run(
    db: &Database,
    user: UserId,
    year: i32,
    month: u32,
    output: Option<&Path>,
) -> Result<()> {
    db.require_user(user)?;
    let Some((start, end)) = month_window(year, month) else {
        bail!("invalid month: {year}-{month}");
    };

    let sessions = db
        .sessions_in_window(user, start, end)
        .context("failed to load month sessions")?;
    let rows = project_month(
        &sessions,
        &db.regulation_table()?,
        &db.location_descriptions(user)?,
        &db.project_names(user)?,
    );
    tracing::debug!(rows = rows.len(), year, month, "exporting sessions");

    if let Some(dir) = output {
        let path = dir.join(export_filename(year, month));
        let file = std::fs::File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        write_csv(file, &rows)?;
        println!("wrote {} rows to {}", rows.len(), path.display());
    } else {
        let stdout = std::io::stdout();
        write_csv(stdout.lock(), &rows)?;
    }
    Ok(())
}

/// Renders export rows as CSV with the original column naming.
fn write_csv<W: Write>(writer: W, rows: &[ExportRow]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "WorkSessionId",
        "WorkingHours",
        "Start",
        "End",
        "LocationDescription",
        "ProjectName",
    ])?;
    for row in rows {
        csv.write_record([
            row.work_session_id.to_string(),
            row.working_hours.to_string(),
            format_timestamp(row.start),
            row.end.map(format_timestamp).unwrap_or_default(),
            row.location_description.clone(),
            row.project_name.clone(),
        ])?;
    }
    csv.flush().context("failed to flush CSV output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use zeit_core::types::SessionId;

    #[test]
    fn filename_follows_convention() {
        assert_eq!(export_filename(2023, 5), "WorkSessions-2023-5.csv");
        assert_eq!(export_filename(2024, 12), "WorkSessions-2024-12.csv");
    }

    #[test]
    fn csv_renders_rows_with_empty_end() {
        let rows = vec![ExportRow {
            work_session_id: SessionId::new(1).unwrap(),
            working_hours: 7.5,
            start: Utc.with_ymd_and_hms(2023, 5, 1, 9, 0, 0).unwrap(),
            end: None,
            location_description: "Office".to_string(),
            project_name: String::new(),
        }];
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &rows).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "WorkSessionId,WorkingHours,Start,End,LocationDescription,ProjectName"
        );
        assert_eq!(lines.next().unwrap(), "1,7.5,2023-05-01T09:00:00Z,,Office,");
    }
}
