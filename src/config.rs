//! Runtime settings shared by the CLI and the HTTP service.

use crate::aggregator::{GradeError, GradeTable};
use clap::ValueEnum;
use tracing::warn;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_LOG_FILE: &str = "logs/grade_stats.log";

/// What to do with grades that cannot be read as numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InvalidGrades {
    /// Fail the whole request on the first unparseable grade.
    #[default]
    Reject,
    /// Drop unparseable grades and compute from what is left.
    Skip,
}

impl InvalidGrades {
    /// Prepares a freshly parsed table for computation.
    ///
    /// `Reject` checks every grade up front, so a bad entry anywhere in the
    /// table fails the request even if the computation would not read it.
    pub fn apply(self, table: &mut GradeTable) -> Result<(), GradeError> {
        match self {
            InvalidGrades::Reject => table.validate(),
            InvalidGrades::Skip => {
                let dropped = table.retain_numeric();
                if dropped > 0 {
                    warn!(dropped, "Skipped unparseable grades");
                }
                Ok(())
            }
        }
    }
}

/// Output format for the offline `report` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Full report: ranking plus every student's breakdown.
    #[default]
    Json,
    /// Ranking only, one `rank,student,average` row per student.
    Csv,
}
