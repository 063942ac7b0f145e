//! Last session and personal best for one exercise

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use crate::db::WorkoutLog;

/// Most recent training day of an exercise
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub day: NaiveDate,
    /// e.g. "Mon Jan 08 2024"
    pub date: String,
    /// Oldest first
    pub logs: Vec<WorkoutLog>,
    /// Heaviest weight ever logged, not just in this session
    pub personal_best: f64,
}

/// Heaviest weight across all logs, 0 when there are none
pub fn personal_best(logs: &[WorkoutLog]) -> f64 {
    logs.iter().map(|l| l.weight).fold(0.0, f64::max)
}

/// Sets of the most recent calendar day, in the viewer's time zone.
///
/// Logs without a timestamp never form a session but still count toward
/// the personal best.
pub fn last_session<Tz: TimeZone>(logs: &[WorkoutLog], tz: &Tz) -> Option<SessionSnapshot> {
    let mut newest_first: Vec<&WorkoutLog> =
        logs.iter().filter(|l| l.created_at.is_some()).collect();
    newest_first.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

    let day_of = |log: &WorkoutLog| log.created_at.map(|t| t.with_timezone(tz).date_naive());
    let day = day_of(*newest_first.first()?)?;

    let mut session: Vec<WorkoutLog> = newest_first
        .into_iter()
        .filter(|l| day_of(*l) == Some(day))
        .cloned()
        .collect();
    session.reverse();

    Some(SessionSnapshot {
        day,
        date: day.format("%a %b %d %Y").to_string(),
        logs: session,
        personal_best: personal_best(logs),
    })
}
