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

use crate::domain::{InventoryConfig, InventoryError, InventoryReport};
use async_trait::async_trait;

/// Primary port - Main interface offered by the inventory domain
///
/// This is what external systems (CLI, library consumers) use to interact
/// with the inventory functionality.
#[async_trait]
pub trait InventoryReportingService: Send + Sync {
    /// Collect one inventory row per host
    ///
    /// # Arguments
    /// * `config` - Anonymization, debug and concurrency options
    ///
    /// # Returns
    /// * `Ok(InventoryReport)` - Rows in host-list order plus per-entity warnings
    /// * `Err(InventoryError)` - Fatal failure (hosts could not be enumerated)
    async fn collect(&self, config: &InventoryConfig) -> Result<InventoryReport, InventoryError>;

    /// Write a collected report to the output sink
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows written
    /// * `Err(InventoryError)` - Output sink failure
    async fn export(&self, report: &InventoryReport) -> Result<usize, InventoryError>;
}
