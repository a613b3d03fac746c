/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! CSV exporter for inventory rows

use crate::domain::{ExportError, InventoryRow};
use crate::ports::RowExporter;
use async_trait::async_trait;
use csv::Writer;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Path that selects standard output instead of a file
pub const STDOUT_PATH: &str = "-";

/// Encode a header and rows as CSV
pub fn encode_csv(headers: &[&str], rows: &[InventoryRow]) -> Result<Vec<u8>, ExportError> {
    let mut wtr = Writer::from_writer(vec![]);

    wtr.write_record(headers)
        .map_err(|e| ExportError::Serialization(format!("CSV header error: {}", e)))?;

    for row in rows {
        wtr.write_record(row.to_record())
            .map_err(|e| ExportError::Serialization(format!("CSV record error: {}", e)))?;
    }

    wtr.into_inner()
        .map_err(|e| ExportError::Serialization(format!("CSV writer error: {}", e)))
}

/// Writes inventory rows as CSV to a file or to stdout
pub struct CsvRowExporter {
    path: PathBuf,
}

impl CsvRowExporter {
    /// Create a new CSV exporter
    ///
    /// # Arguments
    /// * `path` - Output file, or `-` for stdout
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_stdout(&self) -> bool {
        self.path.as_os_str() == STDOUT_PATH
    }
}

#[async_trait]
impl RowExporter for CsvRowExporter {
    async fn export(&self, headers: &[&str], rows: &[InventoryRow]) -> Result<usize, ExportError> {
        let data = encode_csv(headers, rows)?;

        if self.is_stdout() {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(&data)
                .await
                .map_err(|e| ExportError::Io(format!("Failed to write to stdout: {}", e)))?;
            stdout
                .flush()
                .await
                .map_err(|e| ExportError::Io(format!("Failed to flush stdout: {}", e)))?;
            return Ok(rows.len());
        }

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ExportError::Io(format!("Failed to create directory: {}", e)))?;
        }

        fs::write(&self.path, data).await.map_err(|e| {
            ExportError::Io(format!(
                "Error creating output file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(rows.len())
    }

    fn describe(&self) -> String {
        if self.is_stdout() {
            "stdout".to_string()
        } else {
            self.path.display().to_string()
        }
    }
}
