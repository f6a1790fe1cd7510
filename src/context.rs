//! Per-run settings resolved before any registry data is read.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::error::InventoryError;
use crate::model::Architecture;

/// Timestamp layout used in report file names, e.g. `20111208-160135`.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Where the report goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Standard output.
    Stream,
    /// A new file inside this directory.
    File { dir: PathBuf },
}

/// What the user asked for, before anything has been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub host: String,
    pub output_dir: Option<PathBuf>,
}

impl RunRequest {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            output_dir: None,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Checks the output directory and returns the resulting mode.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvalidOutputPath`] if a directory was
    /// requested and does not exist.
    pub fn output_mode(&self) -> Result<OutputMode, InventoryError> {
        match &self.output_dir {
            None => Ok(OutputMode::Stream),
            Some(dir) if dir.is_dir() => Ok(OutputMode::File { dir: dir.clone() }),
            Some(dir) => Err(InventoryError::InvalidOutputPath { path: dir.clone() }),
        }
    }
}

/// Fully resolved settings for one run. Immutable once built.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub host: String,
    pub output: OutputMode,
    pub architecture: Architecture,
    pub started_at: DateTime<Local>,
}

impl RunContext {
    pub fn output_dir(&self) -> Option<&Path> {
        match &self.output {
            OutputMode::Stream => None,
            OutputMode::File { dir } => Some(dir),
        }
    }

    /// Path of the report file, `<dir>/<host>_<YYYYMMDD-HHMMSS>.txt`, in
    /// file mode.
    pub fn report_path(&self) -> Option<PathBuf> {
        let dir = self.output_dir()?;
        let timestamp = self.started_at.format(FILE_TIMESTAMP_FORMAT);
        Some(dir.join(format!("{}_{}.txt", file_safe(&self.host), timestamp)))
    }
}

/// Strips a leading `\\` so UNC-style host names make valid file names.
fn file_safe(host: &str) -> &str {
    host.trim_start_matches('\\')
}
