//! Analytics module - pure derivations over fetched workout logs
//!
//! Features:
//! - Week/day grouping for the history view
//! - Split classification of a training day
//! - Last session and personal best per exercise
//! - Estimated one-rep-max progress series
//!
//! Everything here is recomputed from a snapshot of rows; nothing is cached.
//! Calendar math takes the viewer's time zone as a parameter.

pub mod chart;
pub mod history;
pub mod session;
pub mod split;

pub use chart::{ChartPoint, bar_width, progress_series};
pub use history::{DayGroup, ExerciseSets, WeekGroup, group_by_week};
pub use session::{SessionSnapshot, last_session, personal_best};
pub use split::SplitTag;

/// Short display date, e.g. "Jan 8"
pub(crate) const SHORT_DATE: &str = "%b %-d";

/// Epley estimate: weight * (1 + reps / 30), rounded
pub fn one_rep_max(weight: f64, reps: i32) -> i64 {
    (weight * (1.0 + reps as f64 / 30.0)).round() as i64
}
