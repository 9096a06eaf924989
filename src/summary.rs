use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{AttendanceError, Result};
use crate::models::{AttendanceRecord, AttendanceSummary, StudentAttendance};

pub fn summarize(records: &[AttendanceRecord]) -> Result<AttendanceSummary> {
    if records.is_empty() {
        return Err(AttendanceError::EmptyDataset);
    }

    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for record in records {
        let entry = counts.entry(record.student_name.as_str()).or_insert((0, 0));
        if record.status.is_present() {
            entry.0 += 1;
        }
        entry.1 += 1;
    }

    let students: Vec<StudentAttendance> = counts
        .into_iter()
        .map(|(name, (present, total))| StudentAttendance {
            student_name: name.to_string(),
            present,
            total,
            percentage: attendance_percentage(present, total),
        })
        .collect();

    // Strict comparisons keep the first student in name order on ties.
    let mut most = &students[0];
    let mut least = &students[0];
    for student in &students[1..] {
        if student.percentage > most.percentage {
            most = student;
        }
        if student.percentage < least.percentage {
            least = student;
        }
    }

    let overall_attendance =
        students.iter().map(|s| s.percentage).sum::<f64>() / students.len() as f64;

    debug!(
        students = students.len(),
        records = records.len(),
        overall = overall_attendance,
        "summarized attendance"
    );

    Ok(AttendanceSummary {
        most_regular: most.student_name.clone(),
        least_regular: least.student_name.clone(),
        overall_attendance,
        students,
    })
}

pub fn attendance_percentage(present: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        present as f64 * 100.0 / total as f64
    }
}
