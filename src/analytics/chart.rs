//! Estimated one-rep-max progress series

use std::collections::HashMap;

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use super::{SHORT_DATE, one_rep_max};
use crate::db::WorkoutLog;

/// Best estimated 1RM of one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub day: NaiveDate,
    /// e.g. "Jan 8"
    pub date: String,
    pub one_rep_max: i64,
}

/// One point per training day from oldest-first logs.
///
/// Returns `None` when fewer than two days exist; a single point is not a
/// trend.
pub fn progress_series<Tz: TimeZone>(logs: &[WorkoutLog], tz: &Tz) -> Option<Vec<ChartPoint>> {
    let mut points: Vec<ChartPoint> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for log in logs {
        let Some(created_at) = log.created_at else {
            continue;
        };
        let day = created_at.with_timezone(tz).date_naive();
        let estimate = one_rep_max(log.weight, log.reps);

        match index.get(&day) {
            Some(&i) => {
                if estimate > points[i].one_rep_max {
                    points[i].one_rep_max = estimate;
                }
            }
            None => {
                index.insert(day, points.len());
                points.push(ChartPoint {
                    day,
                    date: day.format(SHORT_DATE).to_string(),
                    one_rep_max: estimate,
                });
            }
        }
    }

    if points.len() < 2 {
        return None;
    }
    Some(points)
}

/// Length of a text bar for `value`, scaled so that `top` fills `width`.
///
/// Values at or below zero give an empty bar and values above `top` are
/// capped at `width`.
pub fn bar_width(value: i64, top: i64, width: usize) -> usize {
    if top <= 0 || value <= 0 {
        return 0;
    }
    let ratio = (value as f64 / top as f64).min(1.0);
    (ratio * width as f64).floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::{create_log, create_untimed_log};
    use chrono::Utc;

    #[test]
    fn test_empty_is_insufficient() {
        assert!(progress_series(&[], &Utc).is_none());
    }

    #[test]
    fn test_single_day_is_insufficient() {
        let logs = vec![
            create_log(1, 100.0, 5, (2024, 1, 1, 10)),
            create_log(2, 105.0, 3, (2024, 1, 1, 11)),
        ];
        assert!(progress_series(&logs, &Utc).is_none());
    }

    #[test]
    fn test_two_days_two_points_chronological() {
        let logs = vec![
            create_log(1, 100.0, 5, (2024, 1, 1, 10)),
            create_log(2, 110.0, 3, (2024, 1, 8, 10)),
        ];
        let points = progress_series(&logs, &Utc).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, "Jan 1");
        assert_eq!(points[0].one_rep_max, 117); // 100 * 1.1667
        assert_eq!(points[1].date, "Jan 8");
        assert_eq!(points[1].one_rep_max, 121); // 110 * 1.1
    }

    #[test]
    fn test_day_keeps_best_estimate_not_heaviest() {
        let logs = vec![
            create_log(1, 100.0, 10, (2024, 1, 1, 10)), // 133
            create_log(2, 120.0, 1, (2024, 1, 1, 11)),  // 124
            create_log(3, 100.0, 5, (2024, 1, 2, 10)),
        ];
        let points = progress_series(&logs, &Utc).unwrap();
        assert_eq!(points[0].one_rep_max, 133);
    }

    #[test]
    fn test_bar_width_scales_to_top() {
        assert_eq!(bar_width(121, 121, 30), 30);
        assert_eq!(bar_width(117, 121, 30), 29);
        assert_eq!(bar_width(60, 120, 30), 15);
    }

    #[test]
    fn test_bar_width_extreme_values() {
        assert_eq!(bar_width(-117, 121, 30), 0);
        assert_eq!(bar_width(0, 121, 30), 0);
        assert_eq!(bar_width(5, -117, 30), 0);
        assert_eq!(bar_width(i64::MAX, i64::MAX, 30), 30);
        assert_eq!(bar_width(117, i64::MAX, 30), 0);
        assert_eq!(bar_width(i64::MAX, 117, 30), 30);
    }

    #[test]
    fn test_huge_weight_series_bars_stay_bounded() {
        let logs = vec![
            create_log(1, 1e18, 1, (2024, 1, 1, 10)),
            create_log(2, 100.0, 5, (2024, 1, 8, 10)),
            create_log(3, -100.0, 5, (2024, 1, 9, 10)),
        ];
        let points = progress_series(&logs, &Utc).unwrap();
        let top = points.iter().map(|p| p.one_rep_max).max().unwrap();
        let bars: Vec<usize> = points.iter().map(|p| bar_width(p.one_rep_max, top, 30)).collect();
        assert_eq!(bars, vec![30, 0, 0]);
    }

    #[test]
    fn test_untimed_logs_ignored() {
        let logs = vec![
            create_untimed_log(1, 200.0),
            create_log(2, 100.0, 5, (2024, 1, 1, 10)),
        ];
        assert!(progress_series(&logs, &Utc).is_none());
    }
}
