//! Hosted backend - PostgREST tables `exercises` and `workout_logs`

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{Exercise, NewExercise, NewWorkoutLog, Store, StoreError, WorkoutLog};

const REST_PREFIX: &str = "rest/v1";
const LOG_SELECT: &str = "id,exercise_id,weight,reps,created_at";

#[derive(Debug, Deserialize)]
struct LogRow {
    id: i64,
    exercise_id: i64,
    weight: f64,
    // numeric columns may come back as 5.0
    reps: f64,
    created_at: Option<DateTime<Utc>>,
    exercises: Option<JoinedExercise>,
}

#[derive(Debug, Deserialize)]
struct JoinedExercise {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: i64,
}

impl From<LogRow> for WorkoutLog {
    fn from(row: LogRow) -> Self {
        WorkoutLog {
            id: row.id,
            exercise_id: row.exercise_id,
            weight: row.weight,
            reps: row.reps.round() as i32,
            created_at: row.created_at,
            exercise_name: row.exercises.and_then(|e| e.name),
        }
    }
}

/// Client for a Supabase-style REST endpoint
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, StoreError> {
        if base_url.trim().is_empty() {
            return Err(StoreError::Config("SUPABASE_URL".into()));
        }
        if api_key.trim().is_empty() {
            return Err(StoreError::Config("SUPABASE_KEY".into()));
        }
        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PREFIX, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    fn send(&self, request: RequestBuilder) -> Result<String, StoreError> {
        let response = self.authorized(request).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "backend request failed");
            return Err(StoreError::Status { status: status.as_u16(), body });
        }
        Ok(body)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<T, StoreError> {
        debug!(table, ?query, "GET");
        let body = self.send(self.client.get(self.url(table)).query(query))?;
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    fn exercise_logs(&self, exercise_id: i64, order: &str) -> Result<Vec<WorkoutLog>, StoreError> {
        let rows: Vec<LogRow> = self.get_json(
            "workout_logs",
            &[
                ("select", LOG_SELECT.to_string()),
                ("exercise_id", format!("eq.{}", exercise_id)),
                ("order", order.to_string()),
            ],
        )?;
        Ok(rows.into_iter().map(WorkoutLog::from).collect())
    }
}

impl Store for RestStore {
    fn list_exercises(&self) -> Result<Vec<Exercise>, StoreError> {
        self.get_json(
            "exercises",
            &[("select", "*".to_string()), ("order", "name.asc".to_string())],
        )
    }

    fn logs_by_weight(&self, exercise_id: i64) -> Result<Vec<WorkoutLog>, StoreError> {
        self.exercise_logs(exercise_id, "weight.desc")
    }

    fn logs_chronological(&self, exercise_id: i64) -> Result<Vec<WorkoutLog>, StoreError> {
        self.exercise_logs(exercise_id, "created_at.asc")
    }

    fn history(&self) -> Result<Vec<WorkoutLog>, StoreError> {
        let rows: Vec<LogRow> = self.get_json(
            "workout_logs",
            &[
                ("select", format!("{},exercises(name)", LOG_SELECT)),
                ("order", "created_at.desc".to_string()),
            ],
        )?;
        Ok(rows.into_iter().map(WorkoutLog::from).collect())
    }

    fn insert_logs(&self, logs: &[NewWorkoutLog]) -> Result<(), StoreError> {
        // One JSON array is one INSERT statement on the server
        self.send(
            self.client
                .post(self.url("workout_logs"))
                .header("Prefer", "return=minimal")
                .json(logs),
        )?;
        debug!(count = logs.len(), "inserted workout logs");
        Ok(())
    }

    fn add_exercise(&self, exercise: &NewExercise) -> Result<i64, StoreError> {
        let body = self.send(
            self.client
                .post(self.url("exercises"))
                .header("Prefer", "return=representation")
                .json(exercise),
        )?;
        let rows: Vec<IdRow> =
            serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;
        rows.first()
            .map(|r| r.id)
            .ok_or_else(|| StoreError::Decode("insert returned no rows".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Category;
    use mockito::Matcher;

    fn store_for(server: &mockito::Server) -> RestStore {
        RestStore::new(&server.url(), "anon-key").unwrap()
    }

    #[test]
    fn test_new_requires_url_and_key() {
        assert!(matches!(RestStore::new("", "key"), Err(StoreError::Config(_))));
        assert!(matches!(RestStore::new("http://x", " "), Err(StoreError::Config(_))));
    }

    #[test]
    fn test_list_exercises_sends_auth_and_order() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/rest/v1/exercises")
            .match_header("apikey", "anon-key")
            .match_header("authorization", "Bearer anon-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "*".into()),
                Matcher::UrlEncoded("order".into(), "name.asc".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"[{"id":1,"name":"Bench Press","category":"Push","target_muscle":"Chest"},
                    {"id":2,"name":"Squat","category":"Legs","target_muscle":null}]"#,
            )
            .create();

        let exercises = store_for(&server).list_exercises().unwrap();
        mock.assert();
        assert_eq!(exercises.len(), 2);
        assert_eq!(exercises[0].category, Category::Push);
        assert_eq!(exercises[0].target_muscle.as_deref(), Some("Chest"));
        assert!(exercises[1].target_muscle.is_none());
    }

    #[test]
    fn test_history_reads_joined_name_and_null_timestamp() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/rest/v1/workout_logs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded(
                    "select".into(),
                    "id,exercise_id,weight,reps,created_at,exercises(name)".into(),
                ),
                Matcher::UrlEncoded("order".into(), "created_at.desc".into()),
            ]))
            .with_body(
                r#"[{"id":7,"exercise_id":1,"weight":102.5,"reps":5.0,
                     "created_at":"2024-01-08T18:30:00.123456+00:00","exercises":{"name":"Bench Press"}},
                    {"id":6,"exercise_id":1,"weight":100,"reps":5,
                     "created_at":null,"exercises":null}]"#,
            )
            .create();

        let logs = store_for(&server).history().unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].reps, 5);
        assert_eq!(logs[0].exercise_name.as_deref(), Some("Bench Press"));
        assert!(logs[0].created_at.is_some());
        assert!(logs[1].created_at.is_none());
        assert!(logs[1].exercise_name.is_none());
    }

    #[test]
    fn test_logs_by_weight_filters_exercise() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/rest/v1/workout_logs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("exercise_id".into(), "eq.3".into()),
                Matcher::UrlEncoded("order".into(), "weight.desc".into()),
            ]))
            .with_body("[]")
            .create();

        assert!(store_for(&server).logs_by_weight(3).unwrap().is_empty());
        mock.assert();
    }

    #[test]
    fn test_insert_posts_one_array() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/rest/v1/workout_logs")
            .match_body(Matcher::Json(serde_json::json!([
                {"exercise_id": 1, "weight": 100.0, "reps": 5},
                {"exercise_id": 1, "weight": 105.0, "reps": 3}
            ])))
            .with_status(201)
            .create();

        store_for(&server)
            .insert_logs(&[
                NewWorkoutLog { exercise_id: 1, weight: 100.0, reps: 5 },
                NewWorkoutLog { exercise_id: 1, weight: 105.0, reps: 3 },
            ])
            .unwrap();
        mock.assert();
    }

    #[test]
    fn test_error_status_is_surfaced() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/rest/v1/workout_logs")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message":"Invalid API key"}"#)
            .create();

        match store_for(&server).history() {
            Err(StoreError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("Invalid API key"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_add_exercise_returns_id() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/rest/v1/exercises")
            .match_header("prefer", "return=representation")
            .with_status(201)
            .with_body(r#"[{"id":42,"name":"Squat","category":"Legs","target_muscle":"Quads"}]"#)
            .create();

        let id = store_for(&server)
            .add_exercise(&NewExercise {
                name: "Squat".into(),
                category: Category::Legs,
                target_muscle: Some("Quads".into()),
            })
            .unwrap();
        assert_eq!(id, 42);
    }
}
