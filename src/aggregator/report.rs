use crate::aggregator::aggregate::{full_student_data, students_rank};
use crate::aggregator::types::{GradeError, GradeTable, StudentReport};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Ranking plus the full breakdown of every student in a table.
#[derive(Debug, Serialize)]
pub struct ClassReport {
    pub generated_at: DateTime<Utc>,
    pub students_rank: Vec<(String, f64)>,
    pub students: Vec<StudentReport>,
}

/// Builds a [`ClassReport`] for every student in `table`, in name order.
pub fn class_report(table: &GradeTable) -> Result<ClassReport, GradeError> {
    let mut students = Vec::with_capacity(table.len());
    for student in table.students() {
        if let Some(report) = full_student_data(table, student)? {
            students.push(report);
        }
    }

    Ok(ClassReport {
        generated_at: Utc::now(),
        students_rank: students_rank(table)?,
        students,
    })
}
