use chrono::NaiveDate;
use tracing::debug;

use crate::error::{AttendanceError, Result};
use crate::models::AttendanceRecord;

pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

/// Parses a user-entered bound. Only `YYYY-MM-DD` is accepted here.
pub fn parse_date(input: &str, bound: &'static str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AttendanceError::MissingDateBound { bound });
    }

    NaiveDate::parse_from_str(trimmed, DATE_INPUT_FORMAT).map_err(|_| {
        AttendanceError::DateParse {
            input: trimmed.to_string(),
        }
    })
}

/// Inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AttendanceError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_date(start, "start")?;
        let end = parse_date(end, "end")?;
        Self::new(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

pub fn filter_by_range(records: &[AttendanceRecord], range: DateRange) -> Vec<AttendanceRecord> {
    let filtered: Vec<AttendanceRecord> = records
        .iter()
        .filter(|record| range.contains(record.date))
        .cloned()
        .collect();

    debug!(
        start = %range.start,
        end = %range.end,
        kept = filtered.len(),
        total = records.len(),
        "filtered records by date"
    );

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::AttendanceStatus;

    fn record(name: &str, day: u32, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord::new(
            name,
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            status,
        )
    }

    fn sample() -> Vec<AttendanceRecord> {
        vec![
            record("Alice", 1, AttendanceStatus::Present),
            record("Alice", 2, AttendanceStatus::Absent),
            record("Bob", 1, AttendanceStatus::Present),
            record("Bob", 2, AttendanceStatus::Present),
            record("Cara", 3, AttendanceStatus::Absent),
        ]
    }

    #[test]
    fn single_day_range_keeps_only_that_day() {
        let range = DateRange::parse("2024-01-01", "2024-01-01").unwrap();
        let filtered = filter_by_range(&sample(), range);

        assert_eq!(
            filtered,
            vec![
                record("Alice", 1, AttendanceStatus::Present),
                record("Bob", 1, AttendanceStatus::Present),
            ]
        );
    }

    #[test]
    fn bounds_are_inclusive_and_order_is_preserved() {
        let range = DateRange::parse("2024-01-02", "2024-01-03").unwrap();
        let names: Vec<String> = filter_by_range(&sample(), range)
            .into_iter()
            .map(|r| format!("{}@{}", r.student_name, r.date))
            .collect();

        assert_eq!(
            names,
            vec!["Alice@2024-01-02", "Bob@2024-01-02", "Cara@2024-01-03"]
        );
    }

    #[test]
    fn filtering_twice_changes_nothing() {
        let range = DateRange::parse("2024-01-02", "2024-01-10").unwrap();
        let once = filter_by_range(&sample(), range);
        let twice = filter_by_range(&once, range);
        assert_eq!(once, twice);
    }

    #[test]
    fn range_without_matches_is_empty() {
        let range = DateRange::parse("2023-12-01", "2023-12-31").unwrap();
        assert!(filter_by_range(&sample(), range).is_empty());
    }

    #[test]
    fn malformed_dates_are_rejected() {
        for input in ["2024/01/01", "01-01-2024", "2024-02-30", "tomorrow"] {
            let err = parse_date(input, "start").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DateParse, "input {input}");
        }
        assert!(matches!(
            parse_date("  ", "end"),
            Err(AttendanceError::MissingDateBound { bound: "end" })
        ));
        assert_eq!(
            parse_date(" 2024-01-05 ", "start").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = DateRange::parse("2024-01-05", "2024-01-01").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }
}
