use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

mod chart;
mod config;
mod error;
mod filter;
mod loader;
mod models;
mod output;
mod pdf;
mod report;
mod session;
mod shell;
mod store;
mod summary;

use config::Settings;
use session::{Analysis, Session};

#[derive(Parser)]
#[command(name = "attendance-analyzer")]
#[command(about = "Student attendance analyzer: per-student percentages, charts and PDF export", long_about = None)]
struct Cli {
    /// Directory that receives a copy of every uploaded CSV
    #[arg(long, global = true, env = "ATTENDANCE_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,
    /// Directory for the chart and the PDF report
    #[arg(long, global = true, env = "ATTENDANCE_REPORTS_DIR", default_value = "reports")]
    reports_dir: PathBuf,
    /// Skip writing the bar chart
    #[arg(long, global = true)]
    no_chart: bool,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV and summarize attendance, optionally within a date range
    Analyze {
        #[arg(long)]
        csv: PathBuf,
        /// First day to include (YYYY-MM-DD)
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// Last day to include (YYYY-MM-DD)
        #[arg(long, requires = "start")]
        end: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Load a CSV and export its table to a PDF report
    Export {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Interactive session: upload, analyze by date range, export
    Shell,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    config::init_logging(&cli.log_level);

    let settings = Settings {
        data_dir: cli.data_dir,
        reports_dir: cli.reports_dir,
        chart_enabled: !cli.no_chart,
    };
    settings.ensure_directories()?;
    info!(
        data_dir = %settings.data_dir.display(),
        reports_dir = %settings.reports_dir.display(),
        "attendance analyzer starting"
    );

    let mut session = Session::new(settings);

    match cli.command {
        Commands::Analyze {
            csv,
            start,
            end,
            format,
        } => {
            let dataset = session
                .upload(&csv)
                .with_context(|| format!("failed to load {}", csv.display()))?;
            if format == OutputFormat::Text {
                print!("{}", report::load_message(dataset));
            }

            let analysis = match (start, end) {
                (Some(start), Some(end)) => session.analyze_range(&start, &end)?,
                _ => session.analyze_all()?,
            };

            match (&analysis, format) {
                (Analysis::Summary(summary), OutputFormat::Json) => {
                    println!("{}", report::summary_json(summary)?);
                    session.write_chart(summary)?;
                }
                (Analysis::NoRecords(_), OutputFormat::Json) => {
                    println!("null");
                }
                (_, OutputFormat::Text) => {
                    let stdout = io::stdout();
                    shell::present_analysis(&session, &analysis, &mut stdout.lock())?;
                }
            }
        }
        Commands::Export { csv } => {
            session
                .upload(&csv)
                .with_context(|| format!("failed to load {}", csv.display()))?;
            let path = session.export().context("failed to export report")?;
            println!("PDF report saved to: {}", path.display());
        }
        Commands::Shell => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            shell::run_shell(&mut session, stdin.lock(), io::stdout(), interactive)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn date_bounds_come_in_pairs() {
        let parsed = Cli::try_parse_from([
            "attendance-analyzer",
            "analyze",
            "--csv",
            "roll.csv",
            "--start",
            "2024-01-01",
        ]);
        assert!(parsed.is_err());

        let cli = Cli::try_parse_from([
            "attendance-analyzer",
            "analyze",
            "--csv",
            "roll.csv",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
            "--format",
            "json",
            "--no-chart",
        ])
        .unwrap();
        assert!(cli.no_chart);
        match cli.command {
            Commands::Analyze { start, end, format, .. } => {
                assert_eq!(start.as_deref(), Some("2024-01-01"));
                assert_eq!(end.as_deref(), Some("2024-01-31"));
                assert!(format == OutputFormat::Json);
            }
            _ => panic!("expected analyze"),
        }
    }
}
