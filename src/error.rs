use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced to the user by the analyzer. None of them end a session.
#[derive(Error, Debug)]
pub enum AttendanceError {
    /// The CSV file could not be opened or read.
    #[error("Failed to load file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the file.
    #[error("Failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A data row is incomplete or carries an unparseable date.
    #[error("Invalid row on line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },

    #[error("CSV must contain 'Student Name', 'Date', and 'Status' columns (missing: {})", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("Invalid date '{input}': expected YYYY-MM-DD")]
    DateParse { input: String },

    #[error("Please enter both start and end dates (missing {bound} date)")]
    MissingDateBound { bound: &'static str },

    #[error("Start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("No attendance records to summarize")]
    EmptyDataset,

    #[error("No attendance data loaded; upload a CSV first")]
    NotLoaded,

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bar chart could not be drawn.
    #[error("Failed to draw chart: {0}")]
    Chart(String),

    /// The finished temporary file could not be moved into place.
    #[error("Failed to save {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Load,
    Validation,
    DateParse,
    Range,
    EmptyDataset,
    NotLoaded,
    Export,
}

impl AttendanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Read { .. } | Self::Csv { .. } | Self::InvalidRow { .. } => ErrorKind::Load,
            Self::MissingColumns { .. } => ErrorKind::Validation,
            Self::DateParse { .. } | Self::MissingDateBound { .. } => ErrorKind::DateParse,
            Self::InvalidRange { .. } => ErrorKind::Range,
            Self::EmptyDataset => ErrorKind::EmptyDataset,
            Self::NotLoaded => ErrorKind::NotLoaded,
            Self::Write { .. } | Self::Persist { .. } | Self::Chart(_) => ErrorKind::Export,
        }
    }
}

pub type Result<T> = std::result::Result<T, AttendanceError>;
