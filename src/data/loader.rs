//! CSV Data Loader Module
//! Reads the hospitalization CSV from the local snapshot or the remote feed using Polars.

use crate::config::DashboardConfig;
use crate::data::processor::{prepare_table, HospitalizationTable};
use polars::prelude::*;
use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to fetch {url}: {source}")]
    Remote {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Unexpected schema: missing column(s) {}", .missing.join(", "))]
    UnexpectedSchema { missing: Vec<String> },
}

/// Where the table comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// Snapshot file shipped next to the dashboard
    Local,
    /// Live CDC feed
    Remote,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Local => f.write_str("local snapshot"),
            DataSource::Remote => f.write_str("remote feed"),
        }
    }
}

/// Anything able to produce a normalized table for a source flag.
pub trait TableSource {
    fn fetch(&self, source: DataSource) -> Result<HospitalizationTable, LoaderError>;
}

/// Reads raw CSV bytes from disk or HTTP and hands them to the normalizer.
pub struct DataLoader {
    local_path: PathBuf,
    data_url: String,
    timeout: Duration,
}

impl DataLoader {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            local_path: config.local_data_path.clone(),
            data_url: config.data_url.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    fn read_local(&self) -> Result<Vec<u8>, LoaderError> {
        fs::read(&self.local_path).map_err(|source| LoaderError::Io {
            path: self.local_path.clone(),
            source,
        })
    }

    fn read_remote(&self) -> Result<Vec<u8>, LoaderError> {
        let remote_err = |source| LoaderError::Remote {
            url: self.data_url.clone(),
            source,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(remote_err)?;
        let bytes = client
            .get(&self.data_url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
            .map_err(remote_err)?;

        Ok(bytes.to_vec())
    }
}

impl TableSource for DataLoader {
    fn fetch(&self, source: DataSource) -> Result<HospitalizationTable, LoaderError> {
        info!("loading data from {}", source);

        let bytes = match source {
            DataSource::Local => self.read_local()?,
            DataSource::Remote => self.read_remote()?,
        };
        debug!("read {} bytes from {}", bytes.len(), source);

        let raw = parse_csv(bytes)?;
        let table = prepare_table(raw)?;

        info!("loaded {} rows from {}", table.len(), source);
        Ok(table)
    }
}

/// Parse CSV bytes with a header row into a DataFrame.
///
/// Every column is read as text; numeric coercion happens during normalization.
pub fn parse_csv(bytes: Vec<u8>) -> Result<DataFrame, LoaderError> {
    let options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_ignore_errors(true);

    let df = options
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::SNAPSHOT_CSV;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn loader_for(path: PathBuf) -> DataLoader {
        DataLoader::new(&DashboardConfig {
            local_data_path: path,
            ..DashboardConfig::default()
        })
    }

    #[test]
    fn loads_local_snapshot() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT_CSV.as_bytes()).unwrap();

        let table = loader_for(file.path().to_path_buf())
            .fetch(DataSource::Local)
            .unwrap();

        assert_eq!(table.len(), 9);
        assert!(table
            .column_names()
            .iter()
            .any(|name| name == "hospitalization_rate"));
    }

    #[test]
    fn missing_snapshot_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.csv");

        let err = loader_for(path.clone())
            .fetch(DataSource::Local)
            .unwrap_err();

        match err {
            LoaderError::Io { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn unreachable_remote_is_remote_error() {
        let loader = DataLoader::new(&DashboardConfig {
            data_url: "http://127.0.0.1:9/rows.csv".to_string(),
            request_timeout_secs: 2,
            ..DashboardConfig::default()
        });

        assert!(matches!(
            loader.fetch(DataSource::Remote),
            Err(LoaderError::Remote { .. })
        ));
    }

    #[test]
    fn parse_csv_reads_every_column_as_text() {
        let df = parse_csv(b"a,b\n1,x\n2.5,y\n".to_vec()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);
        assert_eq!(df.column("a").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("b").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn schema_error_lists_missing_columns() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"State,MonthlyRate\nCA,1.0\n").unwrap();

        let err = loader_for(file.path().to_path_buf())
            .fetch(DataSource::Local)
            .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Unexpected schema"), "{message}");
        assert!(message.contains("_yearmonth"), "{message}");
        assert!(message.contains("race_label"), "{message}");
    }
}
