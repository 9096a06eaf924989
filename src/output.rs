use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{AttendanceError, Result};

/// Writes `bytes` next to `path` first and renames over it once complete, so
/// readers never observe a half-written report.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_error = |source: std::io::Error| AttendanceError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
    file.write_all(bytes).map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|source| AttendanceError::Persist {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
