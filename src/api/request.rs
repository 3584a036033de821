//! Request body validation.
//!
//! Bodies are parsed as JSON regardless of `Content-Type`. Missing fields
//! take defaults (`grades` → `{}`, text fields → `""`); present fields with
//! the wrong JSON type are rejected before any computation runs.

use crate::aggregator::GradeTable;
use crate::aggregator::types::json_kind;
use crate::api::error::ApiError;
use crate::config::InvalidGrades;
use serde_json::{Map, Value};

/// A validated top-level request object.
#[derive(Debug, Default)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    /// Parses a raw body. A JSON `null` body counts as an empty object.
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ApiError::Validation(format!("body is not valid JSON: {e}")))?;

        match value {
            Value::Object(fields) => Ok(Self { fields }),
            Value::Null => Ok(Self::default()),
            other => Err(ApiError::Validation(format!(
                "body must be an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Takes the `grades` object out of the payload.
    pub fn grades(&mut self) -> Result<Map<String, Value>, ApiError> {
        match self.fields.remove("grades") {
            None => Ok(Map::new()),
            Some(Value::Object(grades)) => Ok(grades),
            Some(other) => Err(ApiError::Validation(format!(
                "`grades` must be an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Reads a string field such as `student` or `subject`.
    pub fn text(&self, field: &str) -> Result<String, ApiError> {
        match self.fields.get(field) {
            None => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(ApiError::Validation(format!(
                "`{field}` must be a string, got {}",
                json_kind(other)
            ))),
        }
    }
}

/// Turns an already validated `grades` object into a table ready to compute on.
pub fn build_table(
    grades: Map<String, Value>,
    invalid_grades: InvalidGrades,
) -> Result<GradeTable, ApiError> {
    let mut table = GradeTable::try_from(grades)?;
    invalid_grades.apply(&mut table)?;
    Ok(table)
}
