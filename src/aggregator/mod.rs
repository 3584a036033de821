//! Grade aggregation.
//!
//! Pure functions over a [`GradeTable`]: per-student and per-subject
//! averages, a ranking, and a combined per-student breakdown. Absence of data
//! is reported as `None`, never as zero. A grade that cannot be read as a
//! number fails the whole computation with a [`GradeError`].

pub mod aggregate;
pub mod report;
pub mod types;
pub mod utility;

pub use aggregate::{full_student_data, student_average, students_rank, subject_average};
pub use types::{Grade, GradeError, GradeTable, StudentReport, SubjectMap};
pub use utility::average;
