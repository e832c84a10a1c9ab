//! Recorded sensor data source
//!
//! Loads a JSON array of raw rows once at startup and hands them out one
//! per dashboard tick, wrapping back to the first row after the last.

use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::record::RawRow;
use crate::{Result, SenseError};

/// Raw rows loaded from a JSON file
#[derive(Debug, Clone)]
pub struct RecordSource {
    path: PathBuf,
    rows: Vec<RawRow>,
}

impl RecordSource {
    /// Read and decode `path`
    ///
    /// # Errors
    ///
    /// - `DataSourceMissing` when the file cannot be opened
    /// - `RecordDecode` when the content is not an array of rows, or a row
    ///   has no spectral data
    /// - `EmptyDataSource` when the array is empty
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                log::error!("Sensor data file not found: {}", path.display());
            }
            SenseError::DataSourceMissing {
                path: path.clone(),
                source: Some(e),
            }
        })?;

        let rows = Self::decode(&content, &path)?;
        log::info!("Loaded {} sensor rows from {}", rows.len(), path.display());
        Ok(Self { path, rows })
    }

    /// Wrap rows that are already in memory
    pub fn from_rows(path: impl Into<PathBuf>, rows: Vec<RawRow>) -> Result<Self> {
        let path = path.into();
        if rows.is_empty() {
            return Err(SenseError::EmptyDataSource { path });
        }
        Ok(Self { path, rows })
    }

    fn decode(content: &str, path: &Path) -> Result<Vec<RawRow>> {
        let value: Value = serde_json::from_str(content).map_err(|e| SenseError::RecordDecode {
            index: 0,
            message: e.to_string(),
        })?;
        let Value::Array(items) = value else {
            return Err(SenseError::RecordDecode {
                index: 0,
                message: "expected a JSON array of rows".to_string(),
            });
        };
        if items.is_empty() {
            return Err(SenseError::EmptyDataSource {
                path: path.to_path_buf(),
            });
        }

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let row: RawRow = serde_json::from_value(item).map_err(|e| SenseError::RecordDecode {
                    index,
                    message: e.to_string(),
                })?;
                if !row.has_spectral() {
                    return Err(SenseError::RecordDecode {
                        index,
                        message: "row has no spectral data".to_string(),
                    });
                }
                Ok(row)
            })
            .collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cursor over the rows, starting at the first
    pub fn into_replay(self) -> DashboardReplay {
        DashboardReplay {
            rows: self.rows,
            cursor: 0,
        }
    }
}

/// Wrapping cursor over recorded rows
#[derive(Debug, Clone)]
pub struct DashboardReplay {
    rows: Vec<RawRow>,
    cursor: usize,
}

impl DashboardReplay {
    /// Row for this tick; advances and wraps the cursor
    pub fn next_row(&mut self) -> &RawRow {
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.rows.len();
        if self.cursor == 0 {
            log::debug!("Replay wrapped after {} rows", self.rows.len());
        }
        &self.rows[index]
    }

    /// Index of the row the next tick will return
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
