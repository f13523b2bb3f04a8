use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const DATA_DIR_VAR: &str = "FINTRACK_DATA_DIR";
const LOG_VAR: &str = "FINTRACK_LOG";
const DEFAULT_LOG_FILTER: &str = "fintrack=warn";
const DB_FILE: &str = "fintrack.db";

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) data_dir: PathBuf,
    pub(crate) log_filter: String,
}

impl Config {
    /// Resolve configuration from the environment, falling back to the
    /// platform data directory.
    pub(crate) fn from_env() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_VAR) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };
        let log_filter = std::env::var(LOG_VAR)
            .ok()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        Ok(Self::new(data_dir, log_filter))
    }

    pub(crate) fn new(data_dir: PathBuf, log_filter: String) -> Self {
        Self {
            data_dir,
            log_filter,
        }
    }

    pub(crate) fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    /// Create the data directory if it does not exist yet.
    pub(crate) fn ensure_data_dir(&self) -> Result<&Path> {
        std::fs::create_dir_all(&self.data_dir).with_context(|| {
            format!(
                "Failed to create data directory: {}",
                self.data_dir.display()
            )
        })?;
        Ok(&self.data_dir)
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "fintrack", "FinTrack")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}
