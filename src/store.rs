use tracing::debug;

use crate::error::{AttendanceError, Result};
use crate::models::AttendanceDataset;

/// Holds the dataset from the most recent successful upload.
#[derive(Debug, Default)]
pub struct RecordStore {
    dataset: Option<AttendanceDataset>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, dataset: AttendanceDataset) {
        debug!(
            file = %dataset.source_name,
            records = dataset.len(),
            replaced = self.dataset.is_some(),
            "record store loaded"
        );
        self.dataset = Some(dataset);
    }

    pub fn current(&self) -> Result<&AttendanceDataset> {
        self.dataset.as_ref().ok_or(AttendanceError::NotLoaded)
    }

    pub fn clear(&mut self) {
        self.dataset = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(name: &str) -> AttendanceDataset {
        AttendanceDataset {
            source_name: name.to_string(),
            ..AttendanceDataset::default()
        }
    }

    #[test]
    fn current_requires_a_load() {
        let store = RecordStore::new();
        assert!(matches!(store.current(), Err(AttendanceError::NotLoaded)));
    }

    #[test]
    fn load_replaces_wholesale_and_clear_discards() {
        let mut store = RecordStore::new();
        store.load(dataset("first.csv"));
        store.load(dataset("second.csv"));
        assert_eq!(store.current().unwrap().source_name, "second.csv");

        store.clear();
        assert!(store.current().is_err());
    }
}
