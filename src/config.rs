use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::chart::CHART_FILE_NAME;
use crate::pdf::REPORT_FILE_NAME;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Where each uploaded CSV is copied.
    pub data_dir: PathBuf,
    /// Where the chart and the PDF export are written.
    pub reports_dir: PathBuf,
    pub chart_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            reports_dir: PathBuf::from("reports"),
            chart_enabled: true,
        }
    }
}

impl Settings {
    pub fn chart_path(&self) -> PathBuf {
        self.reports_dir.join(CHART_FILE_NAME)
    }

    pub fn report_path(&self) -> PathBuf {
        self.reports_dir.join(REPORT_FILE_NAME)
    }

    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        for dir in [&self.data_dir, &self.reports_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `log_level` when set.
pub fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry().with(filter).with(layer).init();
}
