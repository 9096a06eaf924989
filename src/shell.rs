use std::io::{self, BufRead, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{AttendanceError, ErrorKind};
use crate::report;
use crate::session::{Analysis, Session};

const HELP: &str = "\
Commands:
  upload <file.csv>        load a CSV, keep a copy and show its summary
  analyze <start> <end>    summarize records between two YYYY-MM-DD dates
  summary                  summarize the whole loaded dataset
  export                   write the loaded table to a PDF
  status                   describe the loaded dataset
  clear                    forget the loaded dataset
  help                     show this message
  quit                     leave the shell
";

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Upload(&'a str),
    Analyze(&'a str, &'a str),
    Usage(&'static str),
    Summary,
    Export,
    Status,
    Clear,
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));
        let args: Vec<&str> = rest.split_whitespace().collect();

        Some(match word {
            "upload" | "load" if rest.is_empty() => Self::Usage("upload <file.csv>"),
            "upload" | "load" => Self::Upload(rest),
            "analyze" if args.len() > 2 => Self::Usage("analyze <start> <end>"),
            "analyze" => Self::Analyze(
                args.first().copied().unwrap_or(""),
                args.get(1).copied().unwrap_or(""),
            ),
            "summary" => Self::Summary,
            "export" => Self::Export,
            "status" => Self::Status,
            "clear" => Self::Clear,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Unknown(other),
        })
    }
}

/// Prefix shown before an error, chosen by which action it interrupts.
pub fn error_title(err: &AttendanceError) -> &'static str {
    match err.kind() {
        ErrorKind::Load | ErrorKind::Validation => "Failed to load file",
        ErrorKind::DateParse | ErrorKind::Range => "Failed to filter data",
        ErrorKind::EmptyDataset => "Failed to analyze attendance",
        ErrorKind::NotLoaded => "No Data",
        ErrorKind::Export => "Failed to export report",
    }
}

pub fn describe_error(err: &AttendanceError) -> String {
    format!("{}: {}", error_title(err), err)
}

/// Prints the summary, the insights and, when enabled, writes the chart.
pub fn present_analysis<W: Write>(
    session: &Session,
    analysis: &Analysis,
    out: &mut W,
) -> io::Result<()> {
    match analysis {
        Analysis::NoRecords(range) => writeln!(
            out,
            "No Data: No records found between {} and {}.",
            range.start, range.end
        ),
        Analysis::Summary(summary) => {
            write!(out, "{}", report::build_report(summary))?;
            match session.write_chart(summary) {
                Ok(Some(path)) => writeln!(out, "Chart saved to {}", path.display()),
                Ok(None) => Ok(()),
                Err(err) => writeln!(out, "{}", describe_error(&err)),
            }
        }
    }
}

fn report_result<W: Write>(
    session: &Session,
    result: crate::error::Result<Analysis>,
    out: &mut W,
) -> io::Result<()> {
    match result {
        Ok(analysis) => present_analysis(session, &analysis, out),
        Err(err) => writeln!(out, "{}", describe_error(&err)),
    }
}

/// Runs the interactive loop until `quit` or end of input. Errors from a
/// command are reported and the loop carries on.
pub fn run_shell<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    mut out: W,
    interactive: bool,
) -> io::Result<()> {
    if interactive {
        writeln!(out, "Student Attendance Analyzer (type 'help' for commands)")?;
    }

    let mut lines = input.lines();
    loop {
        if interactive {
            write!(out, "> ")?;
            out.flush()?;
        }
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        debug!(?command, "shell command");

        match command {
            Command::Usage(usage) => writeln!(out, "Usage: {usage}")?,
            Command::Upload(path) => match session.upload(Path::new(path)) {
                Ok(dataset) => {
                    write!(out, "{}", report::load_message(dataset))?;
                    let result = session.analyze_all();
                    report_result(session, result, &mut out)?;
                }
                Err(err) => writeln!(out, "{}", describe_error(&err))?,
            },
            Command::Analyze(start, end) => {
                let result = session.analyze_range(start, end);
                report_result(session, result, &mut out)?;
            }
            Command::Summary => {
                let result = session.analyze_all();
                report_result(session, result, &mut out)?;
            }
            Command::Export => match session.export() {
                Ok(path) => writeln!(out, "PDF report saved to: {}", path.display())?,
                Err(err) => writeln!(out, "{}", describe_error(&err))?,
            },
            Command::Status => match session.dataset() {
                Ok(dataset) => write!(out, "{}", report::load_message(dataset))?,
                Err(err) => writeln!(out, "{}", describe_error(&err))?,
            },
            Command::Clear => {
                session.clear();
                writeln!(out, "Dataset cleared.")?;
            }
            Command::Help => write!(out, "{HELP}")?,
            Command::Quit => break,
            Command::Unknown(word) => {
                writeln!(out, "Unknown command '{word}'. Type 'help' for commands.")?
            }
        }
    }

    Ok(())
}
