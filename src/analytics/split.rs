//! Split classification of a training day

use std::fmt;

use serde::Serialize;

use crate::db::WorkoutLog;

/// Keyword rules, checked in order; the first hit wins
const RULES: &[(SplitTag, &[&str])] = &[
    (SplitTag::Legs, &["squat", "leg"]),
    (SplitTag::Push, &["bench", "press", "extension"]),
    (SplitTag::Pull, &["deadlift", "row", "curl", "pull"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SplitTag {
    Legs,
    Push,
    Pull,
    Workout,
}

impl SplitTag {
    /// Classify a day by the names of the exercises it contains
    pub fn classify(logs: &[WorkoutLog]) -> Self {
        let names = logs
            .iter()
            .map(|l| l.exercise_name.as_deref().unwrap_or("").to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| names.contains(k)))
            .map(|(tag, _)| *tag)
            .unwrap_or(SplitTag::Workout)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SplitTag::Legs => "LEGS",
            SplitTag::Push => "PUSH",
            SplitTag::Pull => "PULL",
            SplitTag::Workout => "WORKOUT",
        }
    }
}

impl fmt::Display for SplitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}
