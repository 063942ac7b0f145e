//! Database module - data access for exercises and workout logs
//!
//! Two backends implement [`Store`]: a local SQLite file and a hosted
//! PostgREST endpoint.

mod rest;
mod sqlite;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use rest::RestStore;
pub use sqlite::Database;

/// Exercise category shown as the tabs of the log view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Push,
    Pull,
    Legs,
}

impl Category {
    /// Tab order
    pub fn all() -> &'static [Category] {
        &[Category::Push, Category::Pull, Category::Legs]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Push => "Push",
            Category::Pull => "Pull",
            Category::Legs => "Legs",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "push" => Ok(Category::Push),
            "pull" => Ok(Category::Pull),
            "legs" => Ok(Category::Legs),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Exercise reference data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub category: Category,
    pub target_muscle: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExercise {
    pub name: String,
    pub category: Category,
    pub target_muscle: Option<String>,
}

/// One logged set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutLog {
    pub id: i64,
    pub exercise_id: i64,
    pub weight: f64,
    pub reps: i32,
    pub created_at: Option<DateTime<Utc>>,
    /// Joined from `exercises`, only populated by [`Store::history`]
    pub exercise_name: Option<String>,
}

/// Set about to be inserted; id and timestamp come from the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewWorkoutLog {
    pub exercise_id: i64,
    pub weight: f64,
    pub reps: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Missing configuration: {0}")]
    Config(String),
}

/// Data access used by the app. Every call is a single round trip.
pub trait Store {
    /// All exercises, ordered by name
    fn list_exercises(&self) -> Result<Vec<Exercise>, StoreError>;

    /// Logs of one exercise, heaviest first
    fn logs_by_weight(&self, exercise_id: i64) -> Result<Vec<WorkoutLog>, StoreError>;

    /// Logs of one exercise, oldest first
    fn logs_chronological(&self, exercise_id: i64) -> Result<Vec<WorkoutLog>, StoreError>;

    /// Every log with its exercise name, newest first
    fn history(&self) -> Result<Vec<WorkoutLog>, StoreError>;

    /// Insert all sets or none
    fn insert_logs(&self, logs: &[NewWorkoutLog]) -> Result<(), StoreError>;

    fn add_exercise(&self, exercise: &NewExercise) -> Result<i64, StoreError>;
}

/// Case-insensitive exact name lookup, falling back to a unique substring match
pub fn find_exercise<'a>(exercises: &'a [Exercise], name: &str) -> Option<&'a Exercise> {
    let needle = name.to_lowercase();
    if let Some(ex) = exercises.iter().find(|e| e.name.to_lowercase() == needle) {
        return Some(ex);
    }

    let mut partial = exercises
        .iter()
        .filter(|e| e.name.to_lowercase().contains(&needle));
    match (partial.next(), partial.next()) {
        (Some(ex), None) => Some(ex),
        _ => None,
    }
}
