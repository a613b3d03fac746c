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

use crate::domain::{ExportError, InventoryRow};
use async_trait::async_trait;

/// Secondary port - Tabular row export abstraction
///
/// Receives the fixed header row and the ordered inventory rows and writes them
/// to an output sink (file, stdout, in-memory buffer).
#[async_trait]
pub trait RowExporter: Send + Sync {
    /// Write the header and all rows
    ///
    /// # Arguments
    /// * `headers` - Column headers
    /// * `rows` - Rows in output order
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows written
    /// * `Err(ExportError)` - Sink could not be created or written
    async fn export(&self, headers: &[&str], rows: &[InventoryRow]) -> Result<usize, ExportError>;

    /// Human-readable description of the sink, for operator messages
    fn describe(&self) -> String;
}
