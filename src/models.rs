use chrono::NaiveDate;
use serde::Serialize;

pub const STUDENT_NAME_COLUMN: &str = "Student Name";
pub const DATE_COLUMN: &str = "Date";
pub const STATUS_COLUMN: &str = "Status";

pub const REQUIRED_COLUMNS: [&str; 3] = [STUDENT_NAME_COLUMN, DATE_COLUMN, STATUS_COLUMN];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Other(String),
}

impl AttendanceStatus {
    /// Only the exact literal `Present` counts; matching is case-sensitive.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Present" => Self::Present,
            "Absent" => Self::Absent,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Other(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub student_name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// Columns beyond the required three, in file order.
    pub extra: Vec<(String, String)>,
}

impl AttendanceRecord {
    pub fn new(student_name: &str, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            student_name: student_name.to_string(),
            date,
            status,
            extra: Vec::new(),
        }
    }

    /// Cell text for a column, as it should appear in an exported table.
    pub fn cell(&self, column: &str) -> String {
        match column {
            STUDENT_NAME_COLUMN => self.student_name.clone(),
            DATE_COLUMN => self.date.format("%Y-%m-%d").to_string(),
            STATUS_COLUMN => self.status.as_str().to_string(),
            other => self
                .extra
                .iter()
                .find(|(name, _)| name == other)
                .map(|(_, value)| value.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceDataset {
    pub source_name: String,
    pub columns: Vec<String>,
    pub records: Vec<AttendanceRecord>,
}

impl AttendanceDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn student_count(&self) -> usize {
        let mut names: Vec<&str> = self
            .records
            .iter()
            .map(|record| record.student_name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }

    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.date;
        Some(self.records.iter().fold((first, first), |(lo, hi), record| {
            (lo.min(record.date), hi.max(record.date))
        }))
    }

    pub fn row(&self, index: usize) -> Option<Vec<String>> {
        let record = self.records.get(index)?;
        Some(self.columns.iter().map(|column| record.cell(column)).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentAttendance {
    pub student_name: String,
    pub present: usize,
    pub total: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceSummary {
    /// Ordered by student name.
    pub students: Vec<StudentAttendance>,
    pub most_regular: String,
    pub least_regular: String,
    pub overall_attendance: f64,
}

impl AttendanceSummary {
    pub fn get(&self, student_name: &str) -> Option<&StudentAttendance> {
        self.students
            .iter()
            .find(|student| student.student_name == student_name)
    }

    pub fn percentage(&self, student_name: &str) -> Option<f64> {
        self.get(student_name).map(|student| student.percentage)
    }
}
