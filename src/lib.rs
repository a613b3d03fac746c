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

//! vSphere Inventory Library
//!
//! This library inventories host hardware and vSAN capacity from a vSphere management
//! server and renders one normalized row per host, using a Ports and Adapters (Hexagonal)
//! architecture for maintainability and testability.
//!
//! # Architecture
//!
//! - **Domain**: Identity resolution, vSAN topology aggregation and row building
//! - **Ports**: Interfaces for the inventory source, row export and configuration
//! - **Adapters**: HTTPS gateway and JSON snapshot sources, CSV export, TOML configuration
//!
//! # Usage
//!
//! ```rust,no_run
//! use vsphere_inventory::{AppConfig, InventoryReportingService, ServiceContainer, SourceKind};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = AppConfig::default();
//!     config.source.kind = SourceKind::Snapshot;
//!     config.source.snapshot = Some("inventory.json".into());
//!
//!     let container = ServiceContainer::new(config);
//!     let service = container.create_inventory_reporting_service().await?;
//!
//!     let report = service.collect(&container.config().inventory).await?;
//!     let written = service.export(&report).await?;
//!     println!("Wrote {} hosts", written);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod container;
pub mod domain;
pub mod ports;

pub use adapters::{
    CsvRowExporter, HttpInventorySource, SnapshotInventorySource, TomlConfigurationProvider,
};
pub use container::ServiceContainer;
pub use domain::{
    AppConfig, InventoryConfig, InventoryError, InventoryReport, InventoryRow, InventoryWarning,
    OutputConfig, SourceConfig, SourceKind, StorageArchitecture, StorageFacts, INVENTORY_HEADERS,
};
pub use ports::{ConfigurationProvider, InventoryReportingService, InventorySource, RowExporter};
