//! CLI entry point for grade_stats.
//!
//! Serves the grade statistics JSON API, or computes a one-off report from a
//! grade file on disk.

use anyhow::Result;
use clap::{Parser, Subcommand};
use grade_stats::aggregator::report::class_report;
use grade_stats::api::{self, AppState};
use grade_stats::config::{DEFAULT_BIND, DEFAULT_LOG_FILE, InvalidGrades, ReportFormat};
use grade_stats::loader::load_table;
use grade_stats::output::save_report;
use std::ffi::OsStr;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "grade_stats")]
#[command(about = "Grade statistics over HTTP", long_about = None)]
struct Cli {
    /// How to treat grades that are not numbers
    #[arg(
        long,
        global = true,
        value_enum,
        env = "GRADE_STATS_INVALID_GRADES",
        default_value_t = InvalidGrades::Reject
    )]
    invalid_grades: InvalidGrades,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the JSON API
    Serve {
        /// Address to listen on
        #[arg(long, env = "GRADE_STATS_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,
    },
    /// Compute a report from a .json or .csv grade file
    Report {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// File to write the report to (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Json)]
        format: ReportFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => {
            let state = AppState {
                invalid_grades: cli.invalid_grades,
            };
            api::serve(bind, state).await?;
        }
        Commands::Report {
            input,
            output,
            format,
        } => {
            let mut table = load_table(&input)?;
            cli.invalid_grades.apply(&mut table)?;

            let report = class_report(&table)?;
            info!(
                students = table.len(),
                ranked = report.students_rank.len(),
                "Report computed"
            );

            save_report(&report, format, output.as_deref())?;
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard flushes the file writer on drop and must live until
/// the process exits.
fn init_tracing() -> WorkerGuard {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("grade_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive(LevelFilter::INFO.into()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive(LevelFilter::DEBUG.into()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    file_guard
}
