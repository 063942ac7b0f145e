//! SQLite storage for exercises and workout logs

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};
use tracing::{debug, info};

use super::{Category, Exercise, NewExercise, NewWorkoutLog, Store, StoreError, WorkoutLog};

const LOG_COLUMNS: &str = "l.id, l.exercise_id, l.weight, l.reps, l.created_at";

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        info!(path, "opened sqlite database");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Self { conn: Connection::open_in_memory()? };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                category TEXT NOT NULL,
                target_muscle TEXT
            );
            CREATE TABLE IF NOT EXISTS workout_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                exercise_id INTEGER NOT NULL REFERENCES exercises(id),
                weight REAL NOT NULL,
                reps INTEGER NOT NULL,
                created_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_workout_logs_exercise
                ON workout_logs(exercise_id);",
        )?;
        Ok(())
    }

    /// Insert a batch with an explicit timestamp, in one transaction
    pub fn insert_logs_at(
        &self,
        logs: &[NewWorkoutLog],
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        // Fixed-width UTC text keeps ORDER BY created_at chronological
        let stamp = created_at.to_rfc3339_opts(SecondsFormat::Micros, true);
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO workout_logs (exercise_id, weight, reps, created_at) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for log in logs {
                stmt.execute(params![log.exercise_id, log.weight, log.reps, stamp])?;
            }
        }
        tx.commit()?;
        debug!(count = logs.len(), "inserted workout logs");
        Ok(())
    }

    fn query_logs(
        &self,
        sql: &str,
        exercise_id: i64,
    ) -> Result<Vec<WorkoutLog>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let logs = stmt
            .query_map(params![exercise_id], |row| log_from_row(row, None))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }
}

fn log_from_row(row: &Row<'_>, exercise_name: Option<String>) -> rusqlite::Result<WorkoutLog> {
    let created_at: Option<String> = row.get(4)?;
    Ok(WorkoutLog {
        id: row.get(0)?,
        exercise_id: row.get(1)?,
        weight: row.get(2)?,
        reps: row.get(3)?,
        // Unparseable timestamps are treated like missing ones
        created_at: created_at
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|d| d.with_timezone(&Utc)),
        exercise_name,
    })
}

impl Store for Database {
    fn list_exercises(&self) -> Result<Vec<Exercise>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, category, target_muscle FROM exercises ORDER BY name ASC",
        )?;

        let exercises = stmt
            .query_map([], |row| {
                let category: String = row.get(2)?;
                let category = category.parse::<Category>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into())
                })?;
                Ok(Exercise {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    category,
                    target_muscle: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(exercises)
    }

    fn logs_by_weight(&self, exercise_id: i64) -> Result<Vec<WorkoutLog>, StoreError> {
        self.query_logs(
            &format!(
                "SELECT {LOG_COLUMNS} FROM workout_logs l WHERE l.exercise_id = ?1 ORDER BY l.weight DESC, l.id ASC"
            ),
            exercise_id,
        )
    }

    fn logs_chronological(&self, exercise_id: i64) -> Result<Vec<WorkoutLog>, StoreError> {
        self.query_logs(
            &format!(
                "SELECT {LOG_COLUMNS} FROM workout_logs l WHERE l.exercise_id = ?1 ORDER BY l.created_at ASC, l.id ASC"
            ),
            exercise_id,
        )
    }

    fn history(&self) -> Result<Vec<WorkoutLog>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LOG_COLUMNS}, e.name FROM workout_logs l
             LEFT JOIN exercises e ON e.id = l.exercise_id
             ORDER BY l.created_at DESC, l.id DESC"
        ))?;

        let logs = stmt
            .query_map([], |row| {
                let name: Option<String> = row.get(5)?;
                log_from_row(row, name)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    fn insert_logs(&self, logs: &[NewWorkoutLog]) -> Result<(), StoreError> {
        self.insert_logs_at(logs, Utc::now())
    }

    fn add_exercise(&self, exercise: &NewExercise) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO exercises (name, category, target_muscle) VALUES (?1, ?2, ?3)",
            params![exercise.name, exercise.category.as_str(), exercise.target_muscle],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}
