//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core
//! services. Library code never reads environment variables; the binary does that
//! and hands the result over.

use crate::constants::{DEFAULT_DATA_DIR, LOGIN_DATA_FILENAME, PATIENT_DATA_FILENAME};
use crate::{CaresError, CaresResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CaresConfig {
    data_dir: PathBuf,
}

impl CaresConfig {
    /// Create a new `CaresConfig` rooted at `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `CaresError::InvalidInput` if `data_dir` is empty.
    pub fn new(data_dir: PathBuf) -> CaresResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(CaresError::InvalidInput("data_dir cannot be empty".into()));
        }

        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn login_data_path(&self) -> PathBuf {
        self.data_dir.join(LOGIN_DATA_FILENAME)
    }

    pub fn patient_data_path(&self) -> PathBuf {
        self.data_dir.join(PATIENT_DATA_FILENAME)
    }
}

/// Resolve the data directory from an optional override value.
///
/// `None` or a blank value falls back to [`DEFAULT_DATA_DIR`] relative to the
/// working directory.
pub fn resolve_data_dir(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}
