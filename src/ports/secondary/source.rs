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

use crate::domain::{HostRecord, ManagedObjectRef, SourceError, VsanDiskResult, VsanHostConfig};
use async_trait::async_trait;

/// Secondary port - Inventory source abstraction
///
/// This interface abstracts how host data is read from the management server,
/// allowing for different implementations (HTTPS gateway, offline snapshot, fakes for testing).
/// Every call may fail independently; only `list_hosts` failures are fatal to a run.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Enumerate all hosts with summary, hardware, parent and vSAN system references
    ///
    /// # Returns
    /// * `Ok(Vec<HostRecord>)` - Hosts in server order
    /// * `Err(SourceError)` - Hosts could not be enumerated
    async fn list_hosts(&self) -> Result<Vec<HostRecord>, SourceError>;

    /// Retrieve the display name of a managed entity (cluster, folder)
    ///
    /// # Arguments
    /// * `entity` - Reference to the entity
    async fn retrieve_entity_name(&self, entity: &ManagedObjectRef)
        -> Result<String, SourceError>;

    /// Retrieve the configuration of a host's vSAN system
    ///
    /// # Arguments
    /// * `vsan_system` - Reference to the host's vSAN system
    async fn retrieve_vsan_config(
        &self,
        vsan_system: &ManagedObjectRef,
    ) -> Result<VsanHostConfig, SourceError>;

    /// Query the disks visible to a host's vSAN system
    ///
    /// # Arguments
    /// * `vsan_system` - Reference to the host's vSAN system
    async fn query_vsan_disks(
        &self,
        vsan_system: &ManagedObjectRef,
    ) -> Result<Vec<VsanDiskResult>, SourceError>;
}
