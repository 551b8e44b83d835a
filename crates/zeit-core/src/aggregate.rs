//! Aggregation engine: weekly worked hours and monthly statistics.
//!
//! Weekly totals are regulation-adjusted; monthly statistics deliberately
//! use raw durations. Both operate on sessions already selected from the
//! store for the relevant window.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{WorkSession, duration_hours_between};
use crate::regulation::RegulationTable;

/// Rounds to 2 decimal places, half away from zero.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// UTC midnight for a calendar day.
fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
}

/// The half-open Monday-to-Monday UTC week containing `reference`.
#[must_use]
pub fn week_window(reference: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = reference.date_naive();
    let days_since_monday = today.weekday().num_days_from_monday();
    let monday = today - Duration::days(i64::from(days_since_monday));
    let next_monday = monday + Duration::days(7);
    (utc_midnight(monday), utc_midnight(next_monday))
}

/// The half-open `[first of month, first of next month)` UTC window.
///
/// Returns `None` for an invalid month number.
#[must_use]
pub fn month_window(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((utc_midnight(first), utc_midnight(next)))
}

/// Sums regulation-adjusted hours over the week's closed sessions.
///
/// Open sessions contribute nothing even when their start falls inside
/// the window. The result is rounded to 2 decimals, half away from zero;
/// intermediate sums stay unrounded.
#[must_use]
pub fn weekly_worked_hours(sessions: &[WorkSession], table: &RegulationTable) -> f64 {
    let total: f64 = sessions
        .iter()
        .filter_map(WorkSession::duration_hours)
        .map(|raw| table.resolve(raw))
        .sum();
    round2(total)
}

/// Weekly total paired with the user's configured target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyHours {
    pub worked_hours: f64,
    pub working_hours_weekly: u32,
}

/// Mean raw duration for one day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayAverage {
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    pub average_hours: f64,
}

/// Monthly statistics over closed sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAverages {
    pub average_start_time: f64,
    pub average_end_time: f64,
    /// Weekdays with no sessions are absent, not zero-filled.
    pub weekday_averages: Vec<WeekdayAverage>,
}

/// Hour-of-day as a fraction (e.g. 09:30 becomes 9.5).
fn hour_fraction(instant: DateTime<Utc>) -> f64 {
    f64::from(instant.hour()) + f64::from(instant.minute()) / 60.0
}

/// Computes monthly averages over the month's sessions.
///
/// Only closed sessions count. Durations are raw, not regulation-adjusted.
/// Returns `None` when the month holds no closed sessions, which the
/// boundary reports as "no data" rather than a zero-valued result.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn monthly_averages(sessions: &[WorkSession]) -> Option<MonthlyAverages> {
    let closed: Vec<(&WorkSession, DateTime<Utc>)> = sessions
        .iter()
        .filter_map(|s| s.end.map(|end| (s, end)))
        .collect();
    if closed.is_empty() {
        return None;
    }

    let count = closed.len() as f64;
    let start_sum: f64 = closed.iter().map(|(s, _)| hour_fraction(s.start)).sum();
    let end_sum: f64 = closed.iter().map(|(_, end)| hour_fraction(*end)).sum();

    let mut by_weekday: BTreeMap<u8, Vec<f64>> = BTreeMap::new();
    for (session, end) in &closed {
        let weekday = session.start.weekday().num_days_from_sunday() as u8;
        by_weekday
            .entry(weekday)
            .or_default()
            .push(duration_hours_between(session.start, *end));
    }
    let weekday_averages = by_weekday
        .into_iter()
        .map(|(day_of_week, durations)| WeekdayAverage {
            day_of_week,
            average_hours: round2(durations.iter().sum::<f64>() / durations.len() as f64),
        })
        .collect();

    Some(MonthlyAverages {
        average_start_time: round2(start_sum / count),
        average_end_time: round2(end_sum / count),
        weekday_averages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regulation::Regulation;
    use crate::types::{RegulationId, SessionId, UserId};

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn session(id: i64, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> WorkSession {
        WorkSession {
            id: SessionId::new(id).unwrap(),
            user_id: UserId::new(1).unwrap(),
            start,
            end,
            location_id: None,
            project_id: None,
        }
    }

    fn standard_table() -> RegulationTable {
        RegulationTable::new(vec![
            Regulation {
                id: RegulationId::new(1).unwrap(),
                working_hours: 6,
                break_minutes: 30,
            },
            Regulation {
                id: RegulationId::new(2).unwrap(),
                working_hours: 9,
                break_minutes: 45,
            },
        ])
    }

    #[test]
    fn week_window_is_monday_to_monday() {
        // 2023-05-03 is a Wednesday
        let (start, end) = week_window(ts(2023, 5, 3, 14, 30));
        assert_eq!(start, ts(2023, 5, 1, 0, 0));
        assert_eq!(end, ts(2023, 5, 8, 0, 0));
    }

    #[test]
    fn week_window_from_monday_itself() {
        let (start, end) = week_window(ts(2023, 5, 1, 0, 0));
        assert_eq!(start, ts(2023, 5, 1, 0, 0));
        assert_eq!(end, ts(2023, 5, 8, 0, 0));
    }

    #[test]
    fn month_window_handles_december() {
        let (start, end) = month_window(2023, 12).unwrap();
        assert_eq!(start, ts(2023, 12, 1, 0, 0));
        assert_eq!(end, ts(2024, 1, 1, 0, 0));
    }

    #[test]
    fn month_window_rejects_invalid_month() {
        assert!(month_window(2023, 0).is_none());
        assert!(month_window(2023, 13).is_none());
    }

    #[test]
    fn weekly_total_applies_regulation() {
        // One 8h session resolves to the 6h rule: 8 - 0.5 = 7.5
        let sessions = vec![session(
            1,
            ts(2023, 5, 1, 9, 0),
            Some(ts(2023, 5, 1, 17, 0)),
        )];
        let total = weekly_worked_hours(&sessions, &standard_table());
        assert!((total - 7.5).abs() < 1e-9);
    }

    #[test]
    fn weekly_total_skips_open_sessions() {
        let sessions = vec![
            session(1, ts(2023, 5, 1, 9, 0), Some(ts(2023, 5, 1, 17, 0))),
            session(2, ts(2023, 5, 2, 9, 0), None),
        ];
        let total = weekly_worked_hours(&sessions, &standard_table());
        assert!((total - 7.5).abs() < 1e-9);
    }

    #[test]
    fn weekly_total_sums_multiple_days() {
        let sessions = vec![
            session(1, ts(2023, 5, 1, 9, 0), Some(ts(2023, 5, 1, 17, 0))),
            session(2, ts(2023, 5, 2, 8, 0), Some(ts(2023, 5, 2, 18, 0))),
            session(3, ts(2023, 5, 3, 10, 0), Some(ts(2023, 5, 3, 14, 0))),
        ];
        // 7.5 + (10 - 0.75) + 4 = 20.75
        let total = weekly_worked_hours(&sessions, &standard_table());
        assert!((total - 20.75).abs() < 1e-9);
    }

    #[test]
    fn weekly_total_rounds_to_two_decimals() {
        // 9:00 to 16:20 = 7h20m raw, minus 30m = 6.8333... -> 6.83
        let sessions = vec![session(
            1,
            ts(2023, 5, 1, 9, 0),
            Some(ts(2023, 5, 1, 16, 20)),
        )];
        let total = weekly_worked_hours(&sessions, &standard_table());
        assert!((total - 6.83).abs() < 1e-9);
    }

    #[test]
    fn monthly_averages_single_session() {
        // 2023-05-01 is a Monday (day_of_week 1 counting from Sunday)
        let sessions = vec![session(
            1,
            ts(2023, 5, 1, 9, 0),
            Some(ts(2023, 5, 1, 17, 0)),
        )];
        let averages = monthly_averages(&sessions).unwrap();
        assert!((averages.average_start_time - 9.0).abs() < 1e-9);
        assert!((averages.average_end_time - 17.0).abs() < 1e-9);
        assert_eq!(averages.weekday_averages.len(), 1);
        assert_eq!(averages.weekday_averages[0].day_of_week, 1);
        // Statistics use the raw 8h duration, not the adjusted 7.5h
        assert!((averages.weekday_averages[0].average_hours - 8.0).abs() < 1e-9);
    }

    #[test]
    fn monthly_averages_none_without_closed_sessions() {
        assert!(monthly_averages(&[]).is_none());

        let only_open = vec![session(1, ts(2023, 5, 1, 9, 0), None)];
        assert!(monthly_averages(&only_open).is_none());
    }

    #[test]
    fn monthly_averages_groups_by_weekday() {
        let sessions = vec![
            // Two Mondays, 8h and 6h
            session(1, ts(2023, 5, 1, 9, 0), Some(ts(2023, 5, 1, 17, 0))),
            session(2, ts(2023, 5, 8, 9, 0), Some(ts(2023, 5, 8, 15, 0))),
            // One Tuesday, 4h
            session(3, ts(2023, 5, 2, 10, 0), Some(ts(2023, 5, 2, 14, 0))),
        ];
        let averages = monthly_averages(&sessions).unwrap();
        assert_eq!(averages.weekday_averages.len(), 2);
        let monday = &averages.weekday_averages[0];
        assert_eq!(monday.day_of_week, 1);
        assert!((monday.average_hours - 7.0).abs() < 1e-9);
        let tuesday = &averages.weekday_averages[1];
        assert_eq!(tuesday.day_of_week, 2);
        assert!((tuesday.average_hours - 4.0).abs() < 1e-9);
    }

    #[test]
    fn monthly_averages_mean_of_start_times() {
        let sessions = vec![
            session(1, ts(2023, 5, 1, 8, 30), Some(ts(2023, 5, 1, 16, 0))),
            session(2, ts(2023, 5, 2, 9, 30), Some(ts(2023, 5, 2, 18, 0))),
        ];
        let averages = monthly_averages(&sessions).unwrap();
        assert!((averages.average_start_time - 9.0).abs() < 1e-9);
        assert!((averages.average_end_time - 17.0).abs() < 1e-9);
    }

    #[test]
    fn round2_rounds_to_two_decimals() {
        assert!((round2(1.0 / 3.0) - 0.33).abs() < 1e-9);
        assert!((round2(2.0 / 3.0) - 0.67).abs() < 1e-9);
        assert!((round2(-2.0 / 3.0) - (-0.67)).abs() < 1e-9);
        assert!((round2(7.5) - 7.5).abs() < 1e-9);
    }

    #[test]
    fn weekly_hours_serializes_boundary_names() {
        let weekly = WeeklyHours {
            worked_hours: 7.5,
            working_hours_weekly: 40,
        };
        let json = serde_json::to_value(&weekly).unwrap();
        assert_eq!(json["workedHours"], 7.5);
        assert_eq!(json["workingHoursWeekly"], 40);
    }
}
