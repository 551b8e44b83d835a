//! Export projector: flattens a month of sessions into adjusted rows.
//!
//! Rows are recomputed on every call and handed to an external tabular
//! formatter; the engine's responsibility ends at ordered, adjusted rows.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::WorkSession;
use crate::regulation::RegulationTable;
use crate::types::{LocationId, ProjectId, SessionId};

/// One exportable session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub work_session_id: SessionId,
    /// Regulation-adjusted duration in hours; 0-based for open sessions.
    pub working_hours: f64,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// Empty when the session has no location.
    pub location_description: String,
    /// Empty when the session has no project.
    pub project_name: String,
}

/// Projects a month of sessions into export rows ordered by start.
///
/// Location and project text is resolved through the supplied lookup
/// tables; sessions without either get empty fields. An open session
/// exports with a raw duration of zero before adjustment.
#[must_use]
pub fn project_month(
    sessions: &[WorkSession],
    table: &RegulationTable,
    locations: &HashMap<LocationId, String>,
    projects: &HashMap<ProjectId, String>,
) -> Vec<ExportRow> {
    let mut rows: Vec<ExportRow> = sessions
        .iter()
        .map(|session| {
            let raw = session.duration_hours().unwrap_or(0.0);
            ExportRow {
                work_session_id: session.id,
                working_hours: table.resolve(raw),
                start: session.start,
                end: session.end,
                location_description: session
                    .location_id
                    .and_then(|id| locations.get(&id).cloned())
                    .unwrap_or_default(),
                project_name: session
                    .project_id
                    .and_then(|id| projects.get(&id).cloned())
                    .unwrap_or_default(),
            }
        })
        .collect();
    rows.sort_by_key(|row| (row.start, row.work_session_id));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regulation::Regulation;
    use crate::types::{RegulationId, UserId};
    use chrono::TimeZone;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn session(
        id: i64,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        location_id: Option<i64>,
        project_id: Option<i64>,
    ) -> WorkSession {
        WorkSession {
            id: SessionId::new(id).unwrap(),
            user_id: UserId::new(1).unwrap(),
            start,
            end,
            location_id: location_id.map(|l| LocationId::new(l).unwrap()),
            project_id: project_id.map(|p| ProjectId::new(p).unwrap()),
        }
    }

    #[test]
    fn row_below_threshold_keeps_raw_hours() {
        // 8h session, smallest regulation threshold is 9h: no deduction
        let table = RegulationTable::new(vec![Regulation {
            id: RegulationId::new(1).unwrap(),
            working_hours: 9,
            break_minutes: 45,
        }]);
        let sessions = vec![session(
            1,
            ts(2023, 5, 15, 0, 0),
            Some(ts(2023, 5, 15, 8, 0)),
            Some(1),
            Some(1),
        )];
        let locations = HashMap::from([(LocationId::new(1).unwrap(), "Office".to_string())]);
        let projects = HashMap::from([(ProjectId::new(1).unwrap(), "Development".to_string())]);

        let rows = project_month(&sessions, &table, &locations, &projects);
        assert_eq!(rows.len(), 1);
        assert!((rows[0].working_hours - 8.0).abs() < 1e-9);
        assert_eq!(rows[0].location_description, "Office");
        assert_eq!(rows[0].project_name, "Development");
    }

    #[test]
    fn missing_location_and_project_export_empty() {
        let sessions = vec![session(
            1,
            ts(2023, 5, 2, 9, 0),
            Some(ts(2023, 5, 2, 12, 0)),
            None,
            None,
        )];
        let rows = project_month(
            &sessions,
            &RegulationTable::default(),
            &HashMap::new(),
            &HashMap::new(),
        );
        assert_eq!(rows[0].location_description, "");
        assert_eq!(rows[0].project_name, "");
    }

    #[test]
    fn open_session_exports_zero_hours() {
        let sessions = vec![session(1, ts(2023, 5, 2, 9, 0), None, None, None)];
        let rows = project_month(
            &sessions,
            &RegulationTable::default(),
            &HashMap::new(),
            &HashMap::new(),
        );
        assert!((rows[0].working_hours - 0.0).abs() < 1e-9);
        assert!(rows[0].end.is_none());
    }

    #[test]
    fn rows_ordered_by_start_ascending() {
        let sessions = vec![
            session(2, ts(2023, 5, 10, 9, 0), Some(ts(2023, 5, 10, 12, 0)), None, None),
            session(1, ts(2023, 5, 2, 9, 0), Some(ts(2023, 5, 2, 12, 0)), None, None),
        ];
        let rows = project_month(
            &sessions,
            &RegulationTable::default(),
            &HashMap::new(),
            &HashMap::new(),
        );
        assert_eq!(rows[0].work_session_id.get(), 1);
        assert_eq!(rows[1].work_session_id.get(), 2);
    }

    #[test]
    fn adjusted_hours_in_row() {
        let table = RegulationTable::new(vec![Regulation {
            id: RegulationId::new(1).unwrap(),
            working_hours: 6,
            break_minutes: 30,
        }]);
        let sessions = vec![session(
            1,
            ts(2023, 5, 2, 9, 0),
            Some(ts(2023, 5, 2, 17, 0)),
            None,
            None,
        )];
        let rows = project_month(&sessions, &table, &HashMap::new(), &HashMap::new());
        assert!((rows[0].working_hours - 7.5).abs() < 1e-9);
    }
}
