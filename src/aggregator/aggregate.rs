use crate::aggregator::types::{GradeError, GradeTable, StudentReport};
use crate::aggregator::utility::{average, to_numbers};
use std::collections::BTreeMap;

/// Overall average for `student`: the mean of their per-subject averages.
///
/// Every subject carries the same weight regardless of how many grades it
/// holds. Subjects without grades are skipped. Returns `Ok(None)` when the
/// student is unknown, has no subjects, or has no grades at all.
pub fn student_average(student: &str, table: &GradeTable) -> Result<Option<f64>, GradeError> {
    let Some(subjects) = table.student(student) else {
        return Ok(None);
    };

    let mut per_subject = Vec::with_capacity(subjects.len());
    for grades in subjects.values() {
        if let Some(avg) = average(&to_numbers(grades)?) {
            per_subject.push(avg);
        }
    }

    Ok(average(&per_subject))
}

/// Average of `student`'s grades in `subject`.
///
/// A missing subject is treated as an empty list, so it yields `Ok(None)`
/// rather than an error. An unknown student also yields `Ok(None)`.
pub fn subject_average(
    subject: &str,
    table: &GradeTable,
    student: &str,
) -> Result<Option<f64>, GradeError> {
    let Some(subjects) = table.student(student) else {
        return Ok(None);
    };

    match subjects.get(subject) {
        Some(grades) => Ok(average(&to_numbers(grades)?)),
        None => Ok(None),
    }
}

/// Ranks every student with a defined overall average, highest first.
///
/// Equal averages are ordered by student name ascending.
pub fn students_rank(table: &GradeTable) -> Result<Vec<(String, f64)>, GradeError> {
    let mut rank = Vec::with_capacity(table.len());

    for student in table.students() {
        if let Some(avg) = student_average(student, table)? {
            rank.push((student.to_string(), avg));
        }
    }

    rank.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(rank)
}

/// Per-subject averages plus the overall average for `student`.
///
/// Only subjects with at least one grade appear in `subject_averages`.
/// Returns `Ok(None)` when the student is not in the table.
pub fn full_student_data(
    table: &GradeTable,
    student: &str,
) -> Result<Option<StudentReport>, GradeError> {
    let Some(subjects) = table.student(student) else {
        return Ok(None);
    };

    let mut subject_averages = BTreeMap::new();
    for (subject, grades) in subjects {
        if let Some(avg) = average(&to_numbers(grades)?) {
            subject_averages.insert(subject.clone(), avg);
        }
    }

    Ok(Some(StudentReport {
        student: student.to_string(),
        subject_averages,
        overall_average: student_average(student, table)?,
    }))
}
