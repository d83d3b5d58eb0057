//! Dashboard Configuration
//! Optional JSON settings file with defaults for every key.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "dashboard.json";

/// CDC COVID-NET monthly hospitalization rates.
pub const DATA_URL: &str = "https://data.cdc.gov/api/views/cf5u-bm9w/rows.csv";

pub const LOCAL_DATA_PATH: &str = "data.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Snapshot read before the user asks for fresh data.
    pub local_data_path: PathBuf,
    pub data_url: String,
    pub request_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            local_data_path: PathBuf::from(LOCAL_DATA_PATH),
            data_url: DATA_URL.to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl DashboardConfig {
    /// Read settings from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no {} found, using default settings", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;

        info!("loaded settings from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = DashboardConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.data_url, DATA_URL);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "local_data_path": "snapshots/covid.csv" }}"#).unwrap();

        let config = DashboardConfig::load(file.path()).unwrap();
        assert_eq!(config.local_data_path, PathBuf::from("snapshots/covid.csv"));
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(DashboardConfig::load(file.path()).is_err());
    }
}
