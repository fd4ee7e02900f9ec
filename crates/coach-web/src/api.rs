//! REST endpoint handlers.
//!
//! Generation failures are not HTTP failures: `/generate` always answers 200
//! and puts the message in `{"error": ...}`. Only malformed bodies are
//! rejected with 4xx (by the `Json` extractor). Integer fields also accept
//! numeric strings (`"30"`).
//!
//! History reads and writes are blocking file I/O and run on the blocking
//! thread pool.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coach_rs::api::{CompletionOracle, GenerationParams};
use coach_rs::error::HistoryError;
use coach_rs::history::{HistoryEntry, HistoryLog, RECENT_HISTORY_LEN};
use coach_rs::profile::{AthleteProfile, Availability};
use coach_rs::session::Coach;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

/// Shared state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub oracle: Arc<dyn CompletionOracle>,
    pub history: Arc<dyn HistoryLog>,
    pub params: GenerationParams,
}

impl AppState {
    fn coach(&self) -> Coach<'_> {
        Coach::new(
            self.oracle.as_ref(),
            self.history.as_ref(),
            self.params.clone(),
        )
    }
}

/// Body of `POST /generate`. Every field except `feedback` is required.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(deserialize_with = "lenient_int")]
    pub age: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub training_age: i64,
    pub goals: String,
    pub availability: Availability,
    pub equipment: String,
    #[serde(deserialize_with = "lenient_int")]
    pub max_pullup: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub max_hspu: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub week: i64,
    #[serde(default)]
    pub feedback: BTreeMap<String, serde_json::Value>,
}

/// An integer given as a JSON number, a whole float (`30.0`), or a numeric
/// string (`"30"`).
fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        Raw::Float(f) => Err(de::Error::invalid_value(Unexpected::Float(f), &"an integer")),
        Raw::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::invalid_value(Unexpected::Str(&text), &"an integer")),
    }
}

impl From<GenerateRequest> for AthleteProfile {
    fn from(req: GenerateRequest) -> Self {
        AthleteProfile {
            goals: req.goals,
            age: Some(req.age),
            training_age: Some(req.training_age),
            equipment: Some(req.equipment),
            max_pullup: Some(req.max_pullup),
            max_hspu: Some(req.max_hspu),
            week: Some(req.week),
            availability: req.availability,
            last_week_feedback: req.feedback,
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GenerateResponse {
    Plan { plan: String },
    Error { error: String },
}

/// POST /generate: render the prompt (with recent history) and return the
/// model's plan verbatim.
pub async fn post_generate(
    State(app): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Json<GenerateResponse> {
    let profile = AthleteProfile::from(body);
    let recent = blocking_history(&app.history, |h| h.recent(RECENT_HISTORY_LEN)).await;
    let recent = match recent {
        Ok(recent) => recent,
        Err(e) => {
            warn!("POST /generate failed: {e}");
            return Json(GenerateResponse::Error { error: e });
        }
    };
    match app.coach().generate_plan_with(&profile, &recent).await {
        Ok(plan) => {
            info!("POST /generate: {} chars", plan.len());
            Json(GenerateResponse::Plan { plan })
        }
        Err(e) => {
            warn!("POST /generate failed: {e}");
            Json(GenerateResponse::Error {
                error: e.to_string(),
            })
        }
    }
}

/// Body of `POST /feedback`.
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub plan: String,
    pub feedback: String,
}

/// POST /feedback: append `(plan, feedback)` to the history log.
///
/// 204 on success, 400 when the feedback is empty or whitespace-only, 500 if
/// the log cannot be written.
pub async fn post_feedback(
    State(app): State<AppState>,
    Json(body): Json<FeedbackRequest>,
) -> Response {
    if body.feedback.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "feedback must not be empty");
    }
    let entry = HistoryEntry::new(body.plan, body.feedback);
    match blocking_history(&app.history, move |h| h.append(entry)).await {
        Ok(()) => {
            info!("POST /feedback: stored");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            warn!("POST /feedback failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    }
}

/// GET /history: every stored entry, oldest first.
pub async fn get_history(State(app): State<AppState>) -> Response {
    match blocking_history(&app.history, |h| h.load()).await {
        Ok(entries) => Json::<Vec<HistoryEntry>>(entries).into_response(),
        Err(e) => {
            warn!("GET /history failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    }
}

pub async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Run a history operation on the blocking pool.
async fn blocking_history<T, F>(history: &Arc<dyn HistoryLog>, op: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&dyn HistoryLog) -> Result<T, HistoryError> + Send + 'static,
{
    let history = Arc::clone(history);
    match tokio::task::spawn_blocking(move || op(history.as_ref())).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(e) => Err(format!("history task failed: {e}")),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_request_defaults_feedback() {
        let json = r#"{
            "age": 30, "training_age": 5, "goals": "build strength",
            "availability": {"Monday": "available", "Tuesday": "unavailable"},
            "equipment": "barbell", "max_pullup": 10, "max_hspu": 5, "week": 1
        }"#;
        let req: GenerateRequest = serde_json::from_str(json).unwrap();
        assert!(req.feedback.is_empty());

        let profile = AthleteProfile::from(req);
        assert_eq!(profile.max_hspu, Some(5));
        assert_eq!(profile.availability.len(), 2);
        assert!(profile.weekly_sessions.is_none());
    }

    #[test]
    fn generate_request_coerces_numeric_strings() {
        let json = r#"{
            "age": "30", "training_age": " 5 ", "goals": "build strength",
            "availability": {"Monday": "available"}, "equipment": "rings",
            "max_pullup": 12.0, "max_hspu": "4", "week": 2,
            "feedback": {"rpe": 8, "sleep": "poor"}
        }"#;
        let req: GenerateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.age, 30);
        assert_eq!(req.training_age, 5);
        assert_eq!(req.max_pullup, 12);
        assert_eq!(req.max_hspu, 4);
        assert_eq!(req.feedback["rpe"], serde_json::json!(8));
    }

    #[test]
    fn generate_request_rejects_non_numeric_ints() {
        for bad in [r#""thirty""#, "30.5", "true"] {
            let json = format!(
                r#"{{"age": {bad}, "training_age": 5, "goals": "g", "availability": {{}},
                    "equipment": "e", "max_pullup": 1, "max_hspu": 1, "week": 1}}"#
            );
            assert!(serde_json::from_str::<GenerateRequest>(&json).is_err(), "{bad}");
        }
    }

    #[test]
    fn generate_request_requires_fields() {
        let json = r#"{"age": 30, "goals": "x"}"#;
        assert!(serde_json::from_str::<GenerateRequest>(json).is_err());
    }

    #[test]
    fn responses_serialize_to_single_key_objects() {
        let ok = serde_json::to_value(GenerateResponse::Plan {
            plan: "PLAN_X".into(),
        })
        .unwrap();
        assert_eq!(ok, serde_json::json!({"plan": "PLAN_X"}));

        let err = serde_json::to_value(GenerateResponse::Error {
            error: "boom".into(),
        })
        .unwrap();
        assert_eq!(err, serde_json::json!({"error": "boom"}));
    }
}
