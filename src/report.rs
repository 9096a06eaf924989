use std::fmt::Write;

use crate::models::{AttendanceDataset, AttendanceSummary};

pub fn load_message(dataset: &AttendanceDataset) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "File '{}' loaded successfully!",
        dataset.source_name
    );
    if dataset.is_empty() {
        let _ = writeln!(output, "The file contains no attendance records.");
        return output;
    }
    let _ = write!(
        output,
        "{} records across {} students",
        dataset.len(),
        dataset.student_count()
    );
    if let Some((first, last)) = dataset.date_span() {
        let _ = write!(output, " ({} to {})", first, last);
    }
    let _ = writeln!(output);

    output
}

pub fn summary_message(summary: &AttendanceSummary) -> String {
    let mut output = String::new();

    for student in &summary.students {
        let _ = writeln!(output, "{}: {:.2}%", student.student_name, student.percentage);
    }

    output
}

pub fn insights_message(summary: &AttendanceSummary) -> String {
    let mut output = String::new();
    let most = summary.percentage(&summary.most_regular).unwrap_or_default();
    let least = summary.percentage(&summary.least_regular).unwrap_or_default();

    let _ = writeln!(
        output,
        "🎯 Most Regular Student: {} ({:.2}%)",
        summary.most_regular, most
    );
    let _ = writeln!(
        output,
        "🚶 Least Regular Student: {} ({:.2}%)",
        summary.least_regular, least
    );
    let _ = writeln!(
        output,
        "📊 Overall Class Attendance: {:.2}%",
        summary.overall_attendance
    );

    output
}

/// Both dialogs of the form, one after the other.
pub fn build_report(summary: &AttendanceSummary) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Attendance Summary");
    output.push_str(&summary_message(summary));
    let _ = writeln!(output);
    let _ = writeln!(output, "Attendance Insights");
    output.push_str(&insights_message(summary));

    output
}

pub fn summary_json(summary: &AttendanceSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}
