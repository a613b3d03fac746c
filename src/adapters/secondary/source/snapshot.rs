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

//! Offline inventory source backed by a JSON snapshot document

use crate::domain::{HostRecord, ManagedObjectRef, SourceError, VsanDiskResult, VsanHostConfig};
use crate::ports::InventorySource;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

/// Snapshot of a management server's inventory
///
/// ```json
/// {
///   "hosts": [ { "reference": {"type": "HostSystem", "value": "host-12"}, ... } ],
///   "entities": { "domain-c7": "Production" },
///   "vsan_systems": { "vsan-12": { "config": { ... }, "disks": [ ... ] } }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub hosts: Vec<HostRecord>,
    /// Entity names keyed by reference value
    #[serde(default)]
    pub entities: HashMap<String, String>,
    /// vSAN systems keyed by reference value
    #[serde(default)]
    pub vsan_systems: HashMap<String, VsanSystemSnapshot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VsanSystemSnapshot {
    #[serde(default)]
    pub config: VsanHostConfig,
    /// Disk query result; absent when the query was not captured
    #[serde(default)]
    pub disks: Option<Vec<VsanDiskResult>>,
}

/// Inventory source that answers every call from an in-memory snapshot
///
/// Lookups of objects missing from the snapshot fail with `SourceError::NotFound`.
pub struct SnapshotInventorySource {
    snapshot: InventorySnapshot,
}

impl SnapshotInventorySource {
    pub fn new(snapshot: InventorySnapshot) -> Self {
        Self { snapshot }
    }

    /// Load a snapshot from a JSON file
    ///
    /// # Arguments
    /// * `path` - Snapshot document path
    pub async fn load(path: &Path) -> Result<Self, SourceError> {
        let json_string = fs::read_to_string(path).await.map_err(|e| {
            SourceError::Io(format!("Failed to read snapshot {}: {}", path.display(), e))
        })?;

        Self::from_json(&json_string)
    }

    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        serde_json::from_str(json).map(Self::new).map_err(|e| {
            SourceError::InvalidResponse(format!("Snapshot deserialization failed: {}", e))
        })
    }

    fn vsan_system(
        &self,
        reference: &ManagedObjectRef,
    ) -> Result<&VsanSystemSnapshot, SourceError> {
        self.snapshot
            .vsan_systems
            .get(&reference.value)
            .ok_or_else(|| SourceError::NotFound(reference.to_string()))
    }
}

#[async_trait]
impl InventorySource for SnapshotInventorySource {
    async fn list_hosts(&self) -> Result<Vec<HostRecord>, SourceError> {
        Ok(self.snapshot.hosts.clone())
    }

    async fn retrieve_entity_name(&self, entity: &ManagedObjectRef) -> Result<String, SourceError> {
        self.snapshot
            .entities
            .get(&entity.value)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(entity.to_string()))
    }

    async fn retrieve_vsan_config(
        &self,
        vsan_system: &ManagedObjectRef,
    ) -> Result<VsanHostConfig, SourceError> {
        self.vsan_system(vsan_system).map(|system| system.config.clone())
    }

    async fn query_vsan_disks(
        &self,
        vsan_system: &ManagedObjectRef,
    ) -> Result<Vec<VsanDiskResult>, SourceError> {
        self.vsan_system(vsan_system)?
            .disks
            .clone()
            .ok_or_else(|| SourceError::NotFound(format!("disk list for {}", vsan_system)))
    }
}
