//! Editable set rows of the log view

use crate::analytics::one_rep_max;
use crate::db::NewWorkoutLog;

/// Heaviest weight a set may carry, in kg
pub const MAX_WEIGHT: f64 = 1000.0;

pub const MAX_REPS: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Weight,
    Reps,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Weight => "weight",
            Field::Reps => "reps",
        }
    }
}

/// Raw text of one row, as typed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetInput {
    pub weight: String,
    pub reps: String,
}

impl SetInput {
    fn is_filled(&self) -> bool {
        !self.weight.is_empty() && !self.reps.is_empty()
    }

    fn is_touched(&self) -> bool {
        !self.weight.is_empty() || !self.reps.is_empty()
    }

    fn parse(&self) -> Option<(f64, i32)> {
        let weight = self.weight.trim().parse::<f64>().ok()?;
        let reps = self.reps.trim().parse::<i32>().ok()?;
        Some((weight, reps))
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FormError {
    #[error("Please enter at least one set!")]
    NoSets,

    #[error("Set {row}: {field} is not a number")]
    InvalidNumber { row: usize, field: &'static str },

    #[error("Set {row}: {field} is out of range")]
    OutOfRange { row: usize, field: &'static str },

    #[error("Set '{0}' must look like WEIGHTxREPS")]
    Malformed(String),
}

/// Rows being filled in for the selected exercise; never empty
#[derive(Debug, Clone)]
pub struct SetForm {
    rows: Vec<SetInput>,
}

impl Default for SetForm {
    fn default() -> Self {
        Self { rows: vec![SetInput::default()] }
    }
}

impl SetForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[SetInput] {
        &self.rows
    }

    pub fn add_row(&mut self) {
        self.rows.push(SetInput::default());
    }

    /// Removing the only row is a no-op
    pub fn remove_row(&mut self, index: usize) {
        if self.rows.len() > 1 && index < self.rows.len() {
            self.rows.remove(index);
        }
    }

    pub fn update(&mut self, index: usize, field: Field, value: String) {
        if let Some(row) = self.rows.get_mut(index) {
            match field {
                Field::Weight => row.weight = value,
                Field::Reps => row.reps = value,
            }
        }
    }

    pub fn value(&self, index: usize, field: Field) -> &str {
        self.rows
            .get(index)
            .map(|row| match field {
                Field::Weight => row.weight.as_str(),
                Field::Reps => row.reps.as_str(),
            })
            .unwrap_or("")
    }

    /// Any row partially or fully typed in
    pub fn has_unsaved(&self) -> bool {
        self.rows.iter().any(SetInput::is_touched)
    }

    /// Estimated 1RM of a row once both fields are valid numbers
    pub fn estimated_max(&self, index: usize) -> Option<i64> {
        let row = self.rows.get(index)?;
        if !row.is_filled() {
            return None;
        }
        row.parse().map(|(weight, reps)| one_rep_max(weight, reps))
    }

    /// Rows with both fields filled, ready to insert.
    ///
    /// Rows missing either field are left out; a filled row with a
    /// non-numeric or out-of-range field rejects the whole form. Weight
    /// must lie in `0..=MAX_WEIGHT` and reps in `1..=MAX_REPS`.
    pub fn valid_sets(&self, exercise_id: i64) -> Result<Vec<NewWorkoutLog>, FormError> {
        let mut sets = Vec::new();
        for (i, row) in self.rows.iter().enumerate().filter(|(_, r)| r.is_filled()) {
            let row_no = i + 1;
            let weight = row.weight.trim().parse::<f64>().ok().filter(|w| w.is_finite());
            let Some(weight) = weight else {
                return Err(FormError::InvalidNumber { row: row_no, field: Field::Weight.name() });
            };
            if !(0.0..=MAX_WEIGHT).contains(&weight) {
                return Err(FormError::OutOfRange { row: row_no, field: Field::Weight.name() });
            }
            let Ok(reps) = row.reps.trim().parse::<i32>() else {
                return Err(FormError::InvalidNumber { row: row_no, field: Field::Reps.name() });
            };
            if !(1..=MAX_REPS).contains(&reps) {
                return Err(FormError::OutOfRange { row: row_no, field: Field::Reps.name() });
            }
            sets.push(NewWorkoutLog { exercise_id, weight, reps });
        }

        if sets.is_empty() {
            return Err(FormError::NoSets);
        }
        Ok(sets)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Fill a form from `100x5`-style arguments, one row per argument
pub fn parse_sets<S: AsRef<str>>(args: &[S]) -> Result<SetForm, FormError> {
    let mut form = SetForm::new();
    for (i, arg) in args.iter().enumerate() {
        let arg = arg.as_ref();
        let Some((weight, reps)) = arg.to_lowercase().split_once('x').map(|(w, r)| {
            (w.trim().to_string(), r.trim().to_string())
        }) else {
            return Err(FormError::Malformed(arg.to_string()));
        };
        if weight.is_empty() || reps.is_empty() {
            return Err(FormError::Malformed(arg.to_string()));
        }
        if i > 0 {
            form.add_row();
        }
        form.update(i, Field::Weight, weight);
        form.update(i, Field::Reps, reps);
    }
    Ok(form)
}

/// The session's heaviest weight when it beats the previous best
pub fn new_personal_best(sets: &[NewWorkoutLog], previous_best: f64) -> Option<f64> {
    let session_max = sets.iter().map(|s| s.weight).fold(f64::MIN, f64::max);
    (session_max > previous_best).then_some(session_max)
}
