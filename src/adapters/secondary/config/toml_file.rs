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

//! TOML file configuration provider
//!
//! ```toml
//! [source]
//! kind = "http"
//! url = "https://inventory-gw.lab"
//! user = "administrator@vsphere.local"
//! insecure = true
//!
//! [output]
//! path = "hosts_cpu.csv"
//!
//! [inventory]
//! anonymize = false
//! concurrency = 4
//! ```

use crate::domain::{AppConfig, InventoryConfig, InventoryError, OutputConfig, SourceConfig};
use crate::ports::ConfigurationProvider;
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

/// Configuration provider backed by an `AppConfig`, usually read from a TOML file
pub struct TomlConfigurationProvider {
    config: AppConfig,
}

impl TomlConfigurationProvider {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Load configuration from a TOML file; absent tables and keys take their defaults
    pub async fn load(path: &Path) -> Result<Self, InventoryError> {
        let toml_string = fs::read_to_string(path).await.map_err(|e| {
            InventoryError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&toml_string)
    }

    pub fn from_toml_str(toml_string: &str) -> Result<Self, InventoryError> {
        toml::from_str(toml_string)
            .map(Self::new)
            .map_err(|e| InventoryError::Configuration(format!("TOML parsing failed: {}", e)))
    }

    /// Current configuration, for applying command-line overrides
    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl Default for TomlConfigurationProvider {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

#[async_trait]
impl ConfigurationProvider for TomlConfigurationProvider {
    async fn get_source_config(&self) -> Result<SourceConfig, InventoryError> {
        Ok(self.config.source.clone())
    }

    async fn get_output_config(&self) -> Result<OutputConfig, InventoryError> {
        Ok(self.config.output.clone())
    }

    async fn get_inventory_config(&self) -> Result<InventoryConfig, InventoryError> {
        Ok(self.config.inventory.clone())
    }
}
