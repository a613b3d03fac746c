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

//! vSAN disk topology aggregation
//!
//! Each host is aggregated independently. Under OSA every disk group holds one cache SSD
//! and any number of capacity disks; under ESA all claimed disks are capacity disks.

use crate::domain::{
    HostRecord, InventoryError, InventoryWarning, StorageArchitecture, StorageFacts,
    VsanDiskMapping, VsanDiskResult,
};
use crate::ports::InventorySource;
use log::{debug, log_enabled, warn, Level};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Architecture-specific disk layout of one host
#[derive(Debug, Clone)]
pub enum StorageTopology {
    /// OSA disk groups
    DiskGroups(Vec<VsanDiskMapping>),
    /// ESA disk pool as returned by the disk query
    DiskPool(Vec<VsanDiskResult>),
}

impl StorageTopology {
    pub fn architecture(&self) -> StorageArchitecture {
        match self {
            StorageTopology::DiskGroups(_) => StorageArchitecture::Osa,
            StorageTopology::DiskPool(_) => StorageArchitecture::Esa,
        }
    }

    /// Count disks and sum capacity-tier bytes
    pub fn facts(&self) -> StorageFacts {
        let mut facts = StorageFacts::empty(self.architecture());

        match self {
            StorageTopology::DiskGroups(groups) => {
                facts.cache_disks = groups.len() as u32;
                for disk in groups.iter().flat_map(|group| group.non_ssd.iter()) {
                    facts.capacity_disks += 1;
                    facts.capacity_bytes =
                        facts.capacity_bytes.saturating_add(disk.capacity.bytes());
                }
            }
            StorageTopology::DiskPool(disks) => {
                // Unclaimed and spare disks carry no vSAN disk info
                for result in disks.iter().filter(|r| r.disk.vsan_disk_info.is_some()) {
                    facts.capacity_disks += 1;
                    facts.capacity_bytes = facts
                        .capacity_bytes
                        .saturating_add(result.disk.capacity.bytes());
                }
            }
        }

        facts
    }
}

/// Storage facts for one host plus the warning raised while collecting them
#[derive(Debug, Clone, Default)]
pub struct StorageAssessment {
    pub facts: StorageFacts,
    pub warning: Option<InventoryWarning>,
}

impl StorageAssessment {
    fn healthy(facts: StorageFacts) -> Self {
        Self {
            facts,
            warning: None,
        }
    }

    fn degraded(facts: StorageFacts, warning: InventoryWarning) -> Self {
        warn!("Warning: {}", warning);
        Self {
            facts,
            warning: Some(warning),
        }
    }
}

/// Walks each host's vSAN configuration into `StorageFacts`
#[derive(Clone)]
pub struct StorageTopologyAggregator {
    source: Arc<dyn InventorySource>,
    debug: bool,
}

impl StorageTopologyAggregator {
    /// # Arguments
    /// * `source` - Inventory source to query
    /// * `debug` - Dump raw vSAN configuration and disk lists at debug level
    pub fn new(source: Arc<dyn InventorySource>, debug: bool) -> Self {
        Self { source, debug }
    }

    /// Aggregate the storage facts of one host
    ///
    /// Never fails: fetch errors degrade the host to safe defaults and carry a warning.
    pub async fn aggregate(&self, host: &HostRecord) -> StorageAssessment {
        let Some(vsan_system) = host.vsan_system.as_ref() else {
            return StorageAssessment::healthy(StorageFacts::none());
        };

        let config = match self.source.retrieve_vsan_config(vsan_system).await {
            Ok(config) => config,
            Err(reason) => {
                return StorageAssessment::degraded(
                    StorageFacts::none(),
                    InventoryWarning::StorageConfigUnavailable {
                        host: host.name().to_string(),
                        reason,
                    },
                );
            }
        };
        self.dump("vSAN system", host, &config);

        if config.is_esa() {
            return match self.source.query_vsan_disks(vsan_system).await {
                Ok(disks) => {
                    self.dump("vSAN disks", host, &disks);
                    StorageAssessment::healthy(StorageTopology::DiskPool(disks).facts())
                }
                Err(reason) => StorageAssessment::degraded(
                    StorageFacts::empty(StorageArchitecture::Esa),
                    InventoryWarning::DiskQueryFailed {
                        host: host.name().to_string(),
                        reason,
                    },
                ),
            };
        }

        match config.storage_info {
            Some(info) if !info.disk_mapping.is_empty() => {
                StorageAssessment::healthy(StorageTopology::DiskGroups(info.disk_mapping).facts())
            }
            _ => {
                debug!("{} has a vSAN system but no disk groups", host.name());
                StorageAssessment::healthy(StorageFacts::none())
            }
        }
    }

    /// Aggregate every host, preserving host-list order
    ///
    /// # Arguments
    /// * `hosts` - Hosts in output order
    /// * `concurrency` - Hosts aggregated at the same time; 0 or 1 runs sequentially
    ///
    /// # Returns
    /// * One assessment per host, index-aligned with `hosts`
    /// * `Err(InventoryError::Internal)` if a worker task panicked
    pub async fn aggregate_all(
        &self,
        hosts: &[HostRecord],
        concurrency: usize,
    ) -> Result<Vec<StorageAssessment>, InventoryError> {
        if concurrency <= 1 || hosts.len() <= 1 {
            let mut assessments = Vec::with_capacity(hosts.len());
            for host in hosts {
                assessments.push(self.aggregate(host).await);
            }
            return Ok(assessments);
        }

        let permits = Arc::new(Semaphore::new(concurrency));
        let mut workers = JoinSet::new();
        for (index, host) in hosts.iter().cloned().enumerate() {
            let aggregator = self.clone();
            let permits = Arc::clone(&permits);
            workers.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                (index, aggregator.aggregate(&host).await)
            });
        }

        let mut slots: Vec<Option<StorageAssessment>> = vec![None; hosts.len()];
        while let Some(joined) = workers.join_next().await {
            let (index, assessment) = joined
                .map_err(|e| InventoryError::Internal(format!("storage worker failed: {}", e)))?;
            slots[index] = Some(assessment);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    InventoryError::Internal(format!("no storage result for host #{}", index + 1))
                })
            })
            .collect()
    }

    fn dump<T: Serialize>(&self, what: &str, host: &HostRecord, value: &T) {
        if !self.debug || !log_enabled!(Level::Debug) {
            return;
        }
        match serde_json::to_string_pretty(value) {
            Ok(json) => debug!("=== {} for {} ===\n{}", what, host.name(), json),
            Err(e) => debug!("could not encode {} for {}: {}", what, host.name(), e),
        }
    }
}
