//! One dispatch table for every computation endpoint.
//!
//! Each [`Endpoint`] knows its path, which fields it validates, which
//! aggregator it calls, and how the result is shaped in the response.

use crate::aggregator::{full_student_data, student_average, students_rank, subject_average};
use crate::api::AppState;
use crate::api::error::ApiError;
use crate::api::request::{Payload, build_table};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{StatusCode, Uri};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    StudentAvg,
    SubjectAvg,
    StudentsRank,
    FullStudentData,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::StudentAvg,
        Endpoint::SubjectAvg,
        Endpoint::StudentsRank,
        Endpoint::FullStudentData,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::StudentAvg => "/student-avg",
            Endpoint::SubjectAvg => "/subject-avg",
            Endpoint::StudentsRank => "/students-rank",
            Endpoint::FullStudentData => "/full-student-data",
        }
    }

    /// Underscore spelling of [`Endpoint::path`].
    pub fn alias(self) -> &'static str {
        match self {
            Endpoint::StudentAvg => "/student_avg",
            Endpoint::SubjectAvg => "/subject_avg",
            Endpoint::StudentsRank => "/students_rank",
            Endpoint::FullStudentData => "/full_student_data",
        }
    }

    /// Validates the payload, runs the aggregator and shapes the response.
    ///
    /// Every field is validated before the grade table is built, so a
    /// mistyped field is always a validation error even if the table is
    /// also broken.
    pub fn handle(self, mut payload: Payload, state: &AppState) -> Result<Value, ApiError> {
        let grades = payload.grades()?;

        match self {
            Endpoint::StudentAvg => {
                let student = payload.text("student")?;
                let table = build_table(grades, state.invalid_grades)?;
                Ok(json!({
                    "student": student,
                    "student_avg": student_average(&student, &table)?,
                }))
            }
            Endpoint::SubjectAvg => {
                let subject = payload.text("subject")?;
                let student = payload.text("student")?;
                let table = build_table(grades, state.invalid_grades)?;
                Ok(json!({
                    "student": student,
                    "subject": subject,
                    "subject_avg": subject_average(&subject, &table, &student)?,
                }))
            }
            Endpoint::StudentsRank => {
                let table = build_table(grades, state.invalid_grades)?;
                Ok(json!({ "students_rank": students_rank(&table)? }))
            }
            Endpoint::FullStudentData => {
                let student = payload.text("student")?;
                let table = build_table(grades, state.invalid_grades)?;
                Ok(json!({ "full_student_data": full_student_data(&table, &student)? }))
            }
        }
    }
}

/// Parses the body, runs `endpoint` and logs the outcome.
#[tracing::instrument(skip_all, fields(endpoint = endpoint.path(), bytes = body.len()))]
pub fn dispatch(endpoint: Endpoint, state: &AppState, body: &[u8]) -> Result<Json<Value>, ApiError> {
    let result = Payload::parse(body).and_then(|payload| endpoint.handle(payload, state));

    match &result {
        Ok(_) => debug!("Request handled"),
        Err(ApiError::Validation(reason)) => warn!(%reason, "Rejected request"),
        Err(e) => error!(error = %e, "Computation failed"),
    }

    result.map(Json)
}

async fn ping() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    debug!(%uri, "No route");
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// Routes served both at the root and under `/api`.
fn endpoints() -> Router<AppState> {
    let mut router = Router::new().route("/ping", get(ping));

    for endpoint in Endpoint::ALL {
        let handler = move |State(state): State<AppState>, body: Bytes| async move {
            dispatch(endpoint, &state, &body)
        };
        router = router
            .route(endpoint.path(), post(handler.clone()))
            .route(endpoint.alias(), post(handler));
    }

    router
}

/// Builds the full application router. Request bodies have no size cap.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(endpoints())
        .nest("/api", endpoints())
        .fallback(not_found)
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}
