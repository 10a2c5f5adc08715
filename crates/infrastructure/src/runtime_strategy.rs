//! Runtime strategy file
//!
//! An operator can switch the active strategy without the admin API by
//! writing a strategy name to a file and sending SIGHUP. Only the first
//! non-blank line is read.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use application::error::ApplicationError;
use domain::{ChaosStrategy, DomainError};
use tracing::info;

/// File naming the strategy to apply on reload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeStrategyFile {
    path: PathBuf,
}

impl RuntimeStrategyFile {
    /// Point at a strategy file; nothing is read until [`Self::load`]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file
    ///
    /// Returns `Ok(None)` when the file does not exist, so a reload with no
    /// file keeps the current strategy.
    pub async fn load(&self) -> Result<Option<ChaosStrategy>, ApplicationError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No runtime strategy file present");
                return Ok(None);
            },
            Err(e) => {
                return Err(ApplicationError::Configuration(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            },
        };

        parse_first_line(&contents).map(Some).map_err(Into::into)
    }
}

fn parse_first_line(contents: &str) -> Result<ChaosStrategy, DomainError> {
    contents
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| DomainError::ValidationError("Runtime strategy file is empty".to_string()))?
        .parse()
}
