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

//! Dependency injection container for inventory services

use crate::adapters::{CsvRowExporter, Credentials, HttpInventorySource, SnapshotInventorySource};
use crate::domain::{AppConfig, InventoryCollectionService, InventoryError, SourceKind};
use crate::ports::{ConfigurationProvider, InventoryReportingService, InventorySource, RowExporter};
use log::info;
use std::sync::Arc;
use std::time::Duration;

/// Dependency injection container
pub struct ServiceContainer {
    config: AppConfig,
}

impl ServiceContainer {
    /// Create a new service container with configuration
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Create a service container from a configuration provider
    pub async fn from_provider(
        provider: &dyn ConfigurationProvider,
    ) -> Result<Self, InventoryError> {
        Ok(Self::new(AppConfig {
            source: provider.get_source_config().await?,
            output: provider.get_output_config().await?,
            inventory: provider.get_inventory_config().await?,
        }))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Create the inventory source selected by the configuration
    ///
    /// Snapshot files are read here, so an unreadable snapshot fails before any query.
    pub async fn create_inventory_source(
        &self,
    ) -> Result<Arc<dyn InventorySource>, InventoryError> {
        let source = &self.config.source;

        match source.kind {
            SourceKind::Snapshot => {
                let path = source.snapshot.as_ref().ok_or_else(|| {
                    InventoryError::Configuration("snapshot source requires a snapshot path".into())
                })?;
                info!("Reading inventory snapshot {}", path.display());
                let snapshot = SnapshotInventorySource::load(path)
                    .await
                    .map_err(InventoryError::Connection)?;
                Ok(Arc::new(snapshot))
            }
            SourceKind::Http => {
                let url = source.url.as_deref().ok_or_else(|| {
                    InventoryError::Configuration("http source requires a host or url".into())
                })?;
                let credentials = match (&source.user, &source.password) {
                    (Some(user), Some(password)) => Some(Credentials {
                        user: user.clone(),
                        password: password.clone(),
                    }),
                    (Some(user), None) => {
                        return Err(InventoryError::Configuration(format!(
                            "no password available for user {}",
                            user
                        )))
                    }
                    (None, _) => None,
                };

                let http = HttpInventorySource::new(
                    url,
                    credentials,
                    Duration::from_secs(source.timeout_secs),
                    source.insecure,
                    source.retry_count,
                )
                .map_err(InventoryError::Connection)?;
                info!("Using inventory gateway {}", http.base_url());
                Ok(Arc::new(http))
            }
        }
    }

    /// Create the row exporter for the configured output path
    pub fn create_row_exporter(&self) -> Arc<dyn RowExporter> {
        Arc::new(CsvRowExporter::new(self.config.output.path.clone()))
    }

    /// Create the complete inventory reporting service
    pub async fn create_inventory_reporting_service(
        &self,
    ) -> Result<Arc<dyn InventoryReportingService>, InventoryError> {
        let source = self.create_inventory_source().await?;
        let exporter = self.create_row_exporter();

        Ok(Arc::new(InventoryCollectionService::new(source, exporter)))
    }
}
