//! Report formatting and persistence.
//!
//! Writes a [`ClassReport`] as pretty JSON or as a CSV ranking, to a file or
//! to stdout.

use crate::aggregator::report::ClassReport;
use crate::config::ReportFormat;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct RankRow<'a> {
    rank: usize,
    student: &'a str,
    average: f64,
}

/// Writes the ranking as `rank,student,average` rows with a header.
pub fn write_rank_csv<W: Write>(report: &ClassReport, writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);

    for (i, (student, average)) in report.students_rank.iter().enumerate() {
        writer.serialize(RankRow {
            rank: i + 1,
            student,
            average: *average,
        })?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the full report as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write>(report: &ClassReport, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_report<W: Write>(report: &ClassReport, format: ReportFormat, writer: W) -> Result<()> {
    match format {
        ReportFormat::Json => write_json(report, writer),
        ReportFormat::Csv => write_rank_csv(report, writer),
    }
}

/// Saves the report to `path`, or prints it to stdout when no path is given.
pub fn save_report(report: &ClassReport, format: ReportFormat, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), ?format, "Writing report");
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_report(report, format, file)?;
            info!(path = %path.display(), students = report.students.len(), "Report written");
        }
        None => write_report(report, format, io::stdout().lock())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::GradeTable;
    use crate::aggregator::report::class_report;
    use std::env;
    use std::fs;

    fn sample_report() -> ClassReport {
        let mut t = GradeTable::new();
        t.push_grade("ana", "math", 9.0);
        t.push_grade("bo", "math", 6.5);
        t.add_student("cy");
        class_report(&t).unwrap()
    }

    #[test]
    fn test_write_rank_csv() {
        let mut buf = Vec::new();
        write_rank_csv(&sample_report(), &mut buf).unwrap();

        let content = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, vec!["rank,student,average", "1,ana,9.0", "2,bo,6.5"]);
    }

    #[test]
    fn test_write_json_shape() {
        let mut buf = Vec::new();
        write_json(&sample_report(), &mut buf).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(value["generated_at"].is_string());
        assert_eq!(value["students_rank"][0][0], "ana");
        assert_eq!(value["students"].as_array().unwrap().len(), 3);
        assert!(value["students"][2]["overall_average"].is_null());
    }

    #[test]
    fn test_save_report_creates_file() {
        let path = env::temp_dir().join("grade_stats_test_report.csv");
        let _ = fs::remove_file(&path);

        save_report(&sample_report(), ReportFormat::Csv, Some(&path)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("rank,student,average"));

        fs::remove_file(&path).unwrap();
    }
}
