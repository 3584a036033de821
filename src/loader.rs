//! Loads a grade table from disk for the offline `report` command.
//!
//! Two formats are supported, picked by file extension:
//!
//! * `.json`: the same object the HTTP endpoints take as `grades`.
//! * `.csv`: one `student,subject,grade` row per grade. An empty `grade`
//!   declares a subject with no grades yet; an empty `subject` declares the
//!   student only.

use crate::aggregator::GradeTable;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct GradeRow {
    student: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    grade: String,
}

/// Loads a table from `path`, choosing the format from its extension.
pub fn load_table(path: &Path) -> Result<GradeTable> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let table = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => read_json(file),
        Some("csv") => read_csv(file),
        _ => bail!(
            "unsupported grade file {}: expected .json or .csv",
            path.display()
        ),
    }
    .with_context(|| format!("failed to load grades from {}", path.display()))?;

    debug!(path = %path.display(), students = table.len(), "Grade table loaded");
    Ok(table)
}

/// Reads a JSON grade object.
pub fn read_json<R: Read>(reader: R) -> Result<GradeTable> {
    let value: Value = serde_json::from_reader(reader)?;
    let Value::Object(object) = value else {
        bail!("grade file must contain a JSON object");
    };
    Ok(GradeTable::try_from(object)?)
}

/// Reads `student,subject,grade` rows. Cells are trimmed.
pub fn read_csv<R: Read>(reader: R) -> Result<GradeTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut table = GradeTable::new();

    for (i, result) in rdr.deserialize().enumerate() {
        let row: GradeRow = result?;
        // header is line 1
        let line = i + 2;

        if row.student.is_empty() {
            bail!("line {line}: student is empty");
        }

        match (row.subject.is_empty(), row.grade.is_empty()) {
            (true, true) => {
                table.add_student(&row.student);
            }
            (true, false) => bail!("line {line}: grade given without a subject"),
            (false, true) => {
                table.add_subject(&row.student, &row.subject);
            }
            (false, false) => table.push_grade(&row.student, &row.subject, row.grade.as_str()),
        }
    }

    Ok(table)
}
