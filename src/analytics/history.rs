//! Week/day grouping of workout logs for the history view

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate, TimeZone};
use serde::Serialize;

use super::SHORT_DATE;
use crate::db::WorkoutLog;

const UNKNOWN_EXERCISE: &str = "Unknown Exercise";

/// One calendar week, Monday-start
#[derive(Debug, Clone, Serialize)]
pub struct WeekGroup {
    /// Short date of the Monday, e.g. "Jan 1"
    pub label: String,
    pub monday: NaiveDate,
    /// Monday..Sunday, only days with logs
    pub days: Vec<DayGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayGroup {
    /// Weekday name, e.g. "Monday"
    pub name: String,
    /// Short date, e.g. "Jan 1"
    pub date: String,
    /// In the order the grouping pass met them
    pub logs: Vec<WorkoutLog>,
}

/// Sets of one exercise within a day
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSets<'a> {
    pub name: &'a str,
    pub sets: Vec<&'a WorkoutLog>,
}

impl DayGroup {
    /// Logs grouped by exercise name, first-seen order
    pub fn exercises(&self) -> Vec<ExerciseSets<'_>> {
        let mut groups: Vec<ExerciseSets<'_>> = Vec::new();
        for log in &self.logs {
            let name = log.exercise_name.as_deref().unwrap_or(UNKNOWN_EXERCISE);
            match groups.iter_mut().find(|g| g.name == name) {
                Some(group) => group.sets.push(log),
                None => groups.push(ExerciseSets { name, sets: vec![log] }),
            }
        }
        groups
    }
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    // Sunday belongs to the week that started six days earlier
    date - Days::new(date.weekday().num_days_from_monday() as u64)
}

/// Group logs into weeks and days in the viewer's time zone.
///
/// Weeks come out in the order their first log is met, so a newest-first
/// input yields newest-first weeks. Logs without a timestamp are skipped.
pub fn group_by_week<Tz: TimeZone>(logs: &[WorkoutLog], tz: &Tz) -> Vec<WeekGroup> {
    let mut weeks: Vec<(NaiveDate, [Option<DayGroup>; 7])> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for log in logs {
        let Some(created_at) = log.created_at else {
            continue;
        };
        let local = created_at.with_timezone(tz).date_naive();
        let monday = week_start(local);

        let slot = *index.entry(monday).or_insert_with(|| {
            weeks.push((monday, Default::default()));
            weeks.len() - 1
        });

        let day_idx = local.weekday().num_days_from_monday() as usize;
        weeks[slot].1[day_idx]
            .get_or_insert_with(|| DayGroup {
                name: local.format("%A").to_string(),
                date: local.format(SHORT_DATE).to_string(),
                logs: Vec::new(),
            })
            .logs
            .push(log.clone());
    }

    weeks
        .into_iter()
        .map(|(monday, days)| WeekGroup {
            label: monday.format(SHORT_DATE).to_string(),
            monday,
            days: days.into_iter().flatten().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::{create_log, create_named_log, create_untimed_log};
    use chrono::{FixedOffset, Utc};

    fn day_names(week: &WeekGroup) -> Vec<&str> {
        week.days.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_week_start_sunday_goes_back_six_days() {
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(week_start(sunday), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_week_start_crosses_month_boundary() {
        let thursday = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(week_start(thursday), NaiveDate::from_ymd_opt(2024, 1, 29).unwrap());
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_week(&[], &Utc).is_empty());
    }

    #[test]
    fn test_days_ordered_monday_first_regardless_of_input() {
        // Newest first: Sunday, Wednesday, Monday of the same week
        let logs = vec![
            create_log(3, 100.0, 5, (2024, 1, 7, 10)),
            create_log(2, 100.0, 5, (2024, 1, 3, 10)),
            create_log(1, 100.0, 5, (2024, 1, 1, 10)),
        ];
        let weeks = group_by_week(&logs, &Utc);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].label, "Jan 1");
        assert_eq!(day_names(&weeks[0]), vec!["Monday", "Wednesday", "Sunday"]);
        assert_eq!(weeks[0].days[2].date, "Jan 7");
    }

    #[test]
    fn test_weeks_in_first_seen_order() {
        let logs = vec![
            create_log(3, 100.0, 5, (2024, 1, 15, 10)),
            create_log(2, 100.0, 5, (2024, 1, 1, 10)),
            create_log(1, 100.0, 5, (2024, 1, 9, 10)),
        ];
        let labels: Vec<String> = group_by_week(&logs, &Utc).into_iter().map(|w| w.label).collect();
        assert_eq!(labels, vec!["Jan 15", "Jan 1", "Jan 8"]);
    }

    #[test]
    fn test_logs_within_day_keep_encounter_order() {
        let logs = vec![
            create_log(1, 100.0, 5, (2024, 1, 2, 9)),
            create_log(2, 110.0, 5, (2024, 1, 2, 8)),
            create_log(3, 90.0, 5, (2024, 1, 2, 10)),
        ];
        let weeks = group_by_week(&logs, &Utc);
        let ids: Vec<i64> = weeks[0].days[0].logs.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_every_timed_log_in_exactly_one_bucket() {
        let logs = vec![
            create_log(1, 100.0, 5, (2024, 1, 1, 10)),
            create_untimed_log(2, 80.0),
            create_log(3, 100.0, 5, (2024, 1, 14, 23)),
            create_log(4, 100.0, 5, (2024, 1, 15, 0)),
            create_log(5, 100.0, 5, (2023, 12, 31, 12)),
        ];
        let weeks = group_by_week(&logs, &Utc);

        let mut ids: Vec<i64> = weeks
            .iter()
            .flat_map(|w| w.days.iter())
            .flat_map(|d| d.logs.iter().map(|l| l.id))
            .collect();
        ids.sort();
        assert_eq!(ids, vec![1, 3, 4, 5]);
        // Sunday Dec 31 belongs to the week of Dec 25
        assert!(weeks.iter().any(|w| w.label == "Dec 25"));
    }

    #[test]
    fn test_time_zone_moves_log_to_previous_week() {
        // 02:00 UTC Monday is 21:00 Sunday at UTC-5
        let logs = vec![create_log(1, 100.0, 5, (2024, 1, 8, 2))];
        let eastern = FixedOffset::west_opt(5 * 3600).unwrap();

        let weeks = group_by_week(&logs, &eastern);
        assert_eq!(weeks[0].label, "Jan 1");
        assert_eq!(weeks[0].days[0].name, "Sunday");

        let weeks = group_by_week(&logs, &Utc);
        assert_eq!(weeks[0].label, "Jan 8");
    }

    #[test]
    fn test_same_month_day_different_years_stay_apart() {
        let logs = vec![
            create_log(1, 100.0, 5, (2024, 1, 1, 10)),
            create_log(2, 100.0, 5, (2018, 1, 1, 10)),
        ];
        let weeks = group_by_week(&logs, &Utc);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].label, weeks[1].label);
    }

    #[test]
    fn test_day_exercises_grouped_by_name() {
        let logs = vec![
            create_named_log(1, "Bench Press", (2024, 1, 2, 9)),
            create_named_log(2, "Overhead Press", (2024, 1, 2, 9)),
            create_named_log(3, "Bench Press", (2024, 1, 2, 9)),
            create_log(4, 60.0, 10, (2024, 1, 2, 9)),
        ];
        let weeks = group_by_week(&logs, &Utc);
        let exercises = weeks[0].days[0].exercises();

        assert_eq!(exercises.len(), 3);
        assert_eq!(exercises[0].name, "Bench Press");
        assert_eq!(exercises[0].sets.len(), 2);
        assert_eq!(exercises[1].name, "Overhead Press");
        assert_eq!(exercises[2].name, "Unknown Exercise");
    }
}
