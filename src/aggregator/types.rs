//! Data types used by the aggregation functions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Failures raised while reading or converting a grade table.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GradeError {
    #[error("could not convert grade to a number: '{0}'")]
    NotNumeric(String),

    #[error("grades for student '{student}' must be an object of subject lists, got {found}")]
    MalformedStudent { student: String, found: &'static str },

    #[error("grades for student '{student}', subject '{subject}' must be a list, got {found}")]
    MalformedSubject {
        student: String,
        subject: String,
        found: &'static str,
    },

    #[error(
        "grade for student '{student}', subject '{subject}' must be a number or numeric string, got {found}"
    )]
    InvalidGrade {
        student: String,
        subject: String,
        found: &'static str,
    },
}

/// A single grade as submitted: either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Grade {
    Number(f64),
    Text(String),
}

impl Grade {
    /// Converts the grade to a finite `f64`.
    ///
    /// Strings are trimmed before parsing and may use `_` between digits
    /// (`"1_000"`). `"inf"` and `"nan"` parse as floats but are rejected, as
    /// is any other non-finite value.
    pub fn to_f64(&self) -> Result<f64, GradeError> {
        let value = match self {
            Grade::Number(n) => *n,
            Grade::Text(s) => strip_digit_separators(s.trim())
                .and_then(|text| text.parse::<f64>().ok())
                .ok_or_else(|| GradeError::NotNumeric(s.clone()))?,
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(GradeError::NotNumeric(self.to_string()))
        }
    }
}

/// Removes `_` separators. Each one must sit between two ASCII digits.
fn strip_digit_separators(text: &str) -> Option<Cow<'_, str>> {
    if !text.contains('_') {
        return Some(Cow::Borrowed(text));
    }

    let bytes = text.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b != b'_' {
            continue;
        }
        let before = i.checked_sub(1).and_then(|j| bytes.get(j));
        let after = bytes.get(i + 1);
        if !before.is_some_and(u8::is_ascii_digit) || !after.is_some_and(u8::is_ascii_digit) {
            return None;
        }
    }

    Some(Cow::Owned(text.replace('_', "")))
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grade::Number(n) => write!(f, "{n}"),
            Grade::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for Grade {
    fn from(value: f64) -> Self {
        Grade::Number(value)
    }
}

impl From<&str> for Grade {
    fn from(value: &str) -> Self {
        Grade::Text(value.to_string())
    }
}

/// Subject name → grades, for one student.
pub type SubjectMap = BTreeMap<String, Vec<Grade>>;

/// Student name → [`SubjectMap`]. A read-only snapshot supplied per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GradeTable {
    students: BTreeMap<String, SubjectMap>,
}

impl GradeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn student(&self, name: &str) -> Option<&SubjectMap> {
        self.students.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.students.contains_key(name)
    }

    /// Student names in ascending order.
    pub fn students(&self) -> impl Iterator<Item = &str> {
        self.students.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Registers a student, returning their subjects.
    pub fn add_student(&mut self, student: &str) -> &mut SubjectMap {
        self.students.entry(student.to_string()).or_default()
    }

    /// Registers a subject for a student, creating both if missing.
    pub fn add_subject(&mut self, student: &str, subject: &str) -> &mut Vec<Grade> {
        self.add_student(student)
            .entry(subject.to_string())
            .or_default()
    }

    pub fn push_grade(&mut self, student: &str, subject: &str, grade: impl Into<Grade>) {
        self.add_subject(student, subject).push(grade.into());
    }

    /// Checks that every grade in the table converts to a number.
    ///
    /// Returns the first failure in student/subject order.
    pub fn validate(&self) -> Result<(), GradeError> {
        self.students
            .values()
            .flat_map(|subjects| subjects.values())
            .flatten()
            .try_for_each(|g| g.to_f64().map(|_| ()))
    }

    /// Drops every grade that does not convert to a number and returns how
    /// many were removed. Subjects left empty stay in the table.
    pub fn retain_numeric(&mut self) -> usize {
        let mut dropped = 0;

        for (student, subjects) in &mut self.students {
            for (subject, grades) in subjects.iter_mut() {
                grades.retain(|g| match g.to_f64() {
                    Ok(_) => true,
                    Err(e) => {
                        warn!(student = %student, subject = %subject, error = %e, "Dropping unparseable grade");
                        dropped += 1;
                        false
                    }
                });
            }
        }

        dropped
    }
}

impl FromIterator<(String, SubjectMap)> for GradeTable {
    fn from_iter<I: IntoIterator<Item = (String, SubjectMap)>>(iter: I) -> Self {
        Self {
            students: iter.into_iter().collect(),
        }
    }
}

impl TryFrom<Map<String, Value>> for GradeTable {
    type Error = GradeError;

    /// Builds a table from a JSON object, checking the nested shape.
    ///
    /// Grade values are kept as submitted; numeric conversion happens when a
    /// computation reads them.
    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut table = GradeTable::new();

        for (student, subjects) in object {
            let subjects = match subjects {
                Value::Object(subjects) => subjects,
                other => {
                    return Err(GradeError::MalformedStudent {
                        student,
                        found: json_kind(&other),
                    });
                }
            };

            let entry = table.add_student(&student);

            for (subject, grades) in subjects {
                let grades = match grades {
                    Value::Array(grades) => grades,
                    other => {
                        return Err(GradeError::MalformedSubject {
                            student,
                            subject,
                            found: json_kind(&other),
                        });
                    }
                };

                let mut list = Vec::with_capacity(grades.len());
                for grade in grades {
                    match grade {
                        Value::Number(n) => match n.as_f64() {
                            Some(n) => list.push(Grade::Number(n)),
                            None => return Err(GradeError::NotNumeric(n.to_string())),
                        },
                        Value::String(s) => list.push(Grade::Text(s)),
                        other => {
                            return Err(GradeError::InvalidGrade {
                                student,
                                subject,
                                found: json_kind(&other),
                            });
                        }
                    }
                }

                entry.insert(subject, list);
            }
        }

        Ok(table)
    }
}

/// Human-readable JSON type name, used in error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Per-subject and overall averages for one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentReport {
    pub student: String,
    pub subject_averages: BTreeMap<String, f64>,
    pub overall_average: Option<f64>,
}
