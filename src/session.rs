use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::chart::write_bar_chart;
use crate::config::Settings;
use crate::error::Result;
use crate::filter::{filter_by_range, DateRange};
use crate::loader::{load_csv, persist_copy};
use crate::models::{AttendanceDataset, AttendanceSummary};
use crate::pdf::export_pdf;
use crate::store::RecordStore;
use crate::summary::summarize;

#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Summary(AttendanceSummary),
    /// The range matched nothing; reported to the user, not an error.
    NoRecords(DateRange),
}

/// The state behind the analyzer form: one loaded dataset plus where outputs go.
pub struct Session {
    settings: Settings,
    store: RecordStore,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            store: RecordStore::new(),
        }
    }

    pub fn dataset(&self) -> Result<&AttendanceDataset> {
        self.store.current()
    }

    /// Loads and validates `path`, keeps a copy under the data directory and
    /// only then replaces the active dataset.
    pub fn upload(&mut self, path: &Path) -> Result<&AttendanceDataset> {
        let loaded = match load_csv(path) {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "upload rejected");
                return Err(err);
            }
        };

        persist_copy(
            &loaded.bytes,
            &loaded.dataset.source_name,
            &self.settings.data_dir,
        )?;
        self.store.load(loaded.dataset);
        self.store.current()
    }

    pub fn analyze_all(&self) -> Result<Analysis> {
        let dataset = self.store.current()?;
        Ok(Analysis::Summary(summarize(&dataset.records)?))
    }

    pub fn analyze_range(&self, start: &str, end: &str) -> Result<Analysis> {
        let dataset = self.store.current()?;
        let range = DateRange::parse(start, end)?;
        let filtered = filter_by_range(&dataset.records, range);

        if filtered.is_empty() {
            info!(start = %range.start, end = %range.end, "no records in range");
            return Ok(Analysis::NoRecords(range));
        }

        Ok(Analysis::Summary(summarize(&filtered)?))
    }

    /// Returns the chart path, or `None` when charts are switched off.
    pub fn write_chart(&self, summary: &AttendanceSummary) -> Result<Option<PathBuf>> {
        if !self.settings.chart_enabled {
            return Ok(None);
        }
        let path = self.settings.chart_path();
        write_bar_chart(summary, &path)?;
        Ok(Some(path))
    }

    pub fn export(&self) -> Result<PathBuf> {
        let dataset = self.store.current()?;
        let path = self.settings.report_path();
        export_pdf(dataset, &path)?;
        Ok(path)
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AttendanceError, ErrorKind};
    use tempfile::TempDir;

    const ROLL: &str = "Student Name,Date,Status,Room\n\
                        Alice,2024-01-01,Present,A1\n\
                        Alice,2024-01-02,Absent,A1\n\
                        Bob,2024-01-01,Present,B2\n\
                        Bob,2024-01-02,Present,B2\n";

    fn session() -> (TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            data_dir: dir.path().join("data"),
            reports_dir: dir.path().join("reports"),
            chart_enabled: true,
        };
        settings.ensure_directories().unwrap();
        (dir, Session::new(settings))
    }

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn expect_summary(analysis: Analysis) -> AttendanceSummary {
        match analysis {
            Analysis::Summary(summary) => summary,
            other => panic!("expected a summary, got {other:?}"),
        }
    }

    #[test]
    fn upload_copies_file_and_summarizes() {
        let (dir, mut session) = session();
        let path = write(&dir, "roll.csv", ROLL);

        assert_eq!(session.upload(&path).unwrap().len(), 4);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("data").join("roll.csv")).unwrap(),
            ROLL
        );

        let summary = expect_summary(session.analyze_all().unwrap());
        assert_eq!(summary.most_regular, "Bob");
        assert_eq!(summary.least_regular, "Alice");
        assert!((summary.overall_attendance - 75.0).abs() < 1e-9);
    }

    #[test]
    fn failed_upload_keeps_previous_dataset() {
        let (dir, mut session) = session();
        session.upload(&write(&dir, "roll.csv", ROLL)).unwrap();

        let bad = write(&dir, "bad.csv", "Student Name,Date\nCara,2024-01-03\n");
        let err = session.upload(&bad).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(session.dataset().unwrap().source_name, "roll.csv");
        assert!(!dir.path().join("data").join("bad.csv").exists());

        let bad_date = write(
            &dir,
            "bad_date.csv",
            "Student Name,Date,Status\nCara,next tuesday,Present\n",
        );
        let err = session.upload(&bad_date).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Load);
        assert_eq!(session.dataset().unwrap().source_name, "roll.csv");
        assert_eq!(session.dataset().unwrap().len(), 4);
        assert!(!dir.path().join("data").join("bad_date.csv").exists());
    }

    #[test]
    fn header_only_upload_loads_but_cannot_be_summarized() {
        let (dir, mut session) = session();
        let path = write(&dir, "empty.csv", "Student Name,Date,Status\n");

        assert!(session.upload(&path).unwrap().is_empty());
        assert!(matches!(
            session.analyze_all(),
            Err(AttendanceError::EmptyDataset)
        ));
    }

    #[test]
    fn range_analysis_filters_before_summarizing() {
        let (dir, mut session) = session();
        session.upload(&write(&dir, "roll.csv", ROLL)).unwrap();

        let summary = expect_summary(session.analyze_range("2024-01-01", "2024-01-01").unwrap());
        assert_eq!(summary.percentage("Alice"), Some(100.0));
        assert_eq!(summary.percentage("Bob"), Some(100.0));
        assert!((summary.overall_attendance - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_range_is_informational() {
        let (dir, mut session) = session();
        session.upload(&write(&dir, "roll.csv", ROLL)).unwrap();

        let analysis = session.analyze_range("2025-01-01", "2025-01-31").unwrap();
        assert!(matches!(analysis, Analysis::NoRecords(_)));
    }

    #[test]
    fn range_analysis_errors() {
        let (dir, mut session) = session();
        assert_eq!(
            session.analyze_range("2024-01-01", "2024-01-02").unwrap_err().kind(),
            ErrorKind::NotLoaded
        );

        session.upload(&write(&dir, "roll.csv", ROLL)).unwrap();
        assert_eq!(
            session.analyze_range("", "2024-01-02").unwrap_err().kind(),
            ErrorKind::DateParse
        );
        assert_eq!(
            session.analyze_range("01/01/2024", "2024-01-02").unwrap_err().kind(),
            ErrorKind::DateParse
        );
        assert_eq!(
            session.analyze_range("2024-01-05", "2024-01-02").unwrap_err().kind(),
            ErrorKind::Range
        );
    }

    #[test]
    fn export_requires_a_dataset() {
        let (dir, mut session) = session();
        assert!(matches!(session.export(), Err(AttendanceError::NotLoaded)));

        session.upload(&write(&dir, "roll.csv", ROLL)).unwrap();
        let path = session.export().unwrap();
        assert_eq!(path, dir.path().join("reports").join("attendance_report.pdf"));

        let pdf = String::from_utf8_lossy(&std::fs::read(&path).unwrap()).into_owned();
        assert!(pdf.contains("(Room) Tj"));
        assert!(pdf.contains("(B2) Tj"));

        session.clear();
        assert!(session.export().is_err());
    }

    #[test]
    fn chart_follows_settings() {
        let (dir, mut session) = session();
        session.upload(&write(&dir, "roll.csv", ROLL)).unwrap();
        let summary = expect_summary(session.analyze_all().unwrap());

        let path = session.write_chart(&summary).unwrap().unwrap();
        assert!(path.ends_with("attendance_summary.svg"));
        assert!(path.exists());

        session.settings.chart_enabled = false;
        assert_eq!(session.write_chart(&summary).unwrap(), None);
    }
}
