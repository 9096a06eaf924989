use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{debug, info};

use crate::error::{AttendanceError, Result};
use crate::models::{
    AttendanceDataset, AttendanceRecord, AttendanceStatus, DATE_COLUMN, REQUIRED_COLUMNS,
    STATUS_COLUMN, STUDENT_NAME_COLUMN,
};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// A validated dataset together with the exact bytes it was read from.
pub struct LoadedCsv {
    pub dataset: AttendanceDataset,
    pub bytes: Vec<u8>,
}

pub fn load_csv(path: &Path) -> Result<LoadedCsv> {
    let bytes = std::fs::read(path).map_err(|source| AttendanceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let source_name = base_name(path);
    let dataset = parse_csv(&bytes, &source_name, path)?;

    info!(
        file = %source_name,
        records = dataset.len(),
        "loaded attendance CSV"
    );

    Ok(LoadedCsv { dataset, bytes })
}

pub fn parse_csv(bytes: &[u8], source_name: &str, path: &Path) -> Result<AttendanceDataset> {
    let csv_error = |source: csv::Error| AttendanceError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let columns: Vec<String> = headers.iter().map(str::to_string).collect();
    let layout = ColumnLayout::resolve(&columns)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(csv_error)?;
        records.push(layout.parse_row(&row, &columns)?);
    }

    debug!(columns = ?columns, "parsed CSV header");

    Ok(AttendanceDataset {
        source_name: source_name.to_string(),
        columns,
        records,
    })
}

/// Writes the uploaded file unchanged into `data_dir`, replacing any earlier copy.
pub fn persist_copy(bytes: &[u8], source_name: &str, data_dir: &Path) -> Result<PathBuf> {
    let target = data_dir.join(source_name);
    std::fs::write(&target, bytes).map_err(|source| AttendanceError::Write {
        path: target.clone(),
        source,
    })?;
    debug!(path = %target.display(), "stored copy of upload");
    Ok(target)
}

pub fn parse_cell_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|value| value.date())
        })
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attendance.csv".to_string())
}

struct ColumnLayout {
    name: usize,
    date: usize,
    status: usize,
}

impl ColumnLayout {
    fn resolve(columns: &[String]) -> Result<Self> {
        let position = |wanted: &str| columns.iter().position(|column| column == wanted);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|wanted| position(**wanted).is_none())
            .map(|wanted| wanted.to_string())
            .collect();

        match (
            position(STUDENT_NAME_COLUMN),
            position(DATE_COLUMN),
            position(STATUS_COLUMN),
        ) {
            (Some(name), Some(date), Some(status)) => Ok(Self { name, date, status }),
            _ => Err(AttendanceError::MissingColumns { missing }),
        }
    }

    fn parse_row(&self, row: &StringRecord, columns: &[String]) -> Result<AttendanceRecord> {
        let line = row.position().map(|pos| pos.line()).unwrap_or(0);
        let invalid = |reason: String| AttendanceError::InvalidRow { line, reason };

        if row.len() != columns.len() {
            return Err(invalid(format!(
                "expected {} fields, found {}",
                columns.len(),
                row.len()
            )));
        }

        let student_name = required_field(row, self.name, columns, line)?;
        let raw_date = required_field(row, self.date, columns, line)?;
        let status = required_field(row, self.status, columns, line)?;
        let date = parse_cell_date(raw_date)
            .ok_or_else(|| invalid(format!("unparseable date '{raw_date}'")))?;

        let extra = columns
            .iter()
            .enumerate()
            .filter(|(index, _)| ![self.name, self.date, self.status].contains(index))
            .map(|(index, column)| (column.clone(), row.get(index).unwrap_or("").to_string()))
            .collect();

        let mut record =
            AttendanceRecord::new(student_name, date, AttendanceStatus::parse(status));
        record.extra = extra;
        Ok(record)
    }
}

fn required_field<'r>(
    row: &'r StringRecord,
    index: usize,
    columns: &[String],
    line: u64,
) -> Result<&'r str> {
    let value = row.get(index).unwrap_or("");
    if value.is_empty() {
        return Err(AttendanceError::InvalidRow {
            line,
            reason: format!("empty {}", columns[index]),
        });
    }
    Ok(value)
}
