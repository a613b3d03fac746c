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

//! In-memory inventory source and host builders shared by service tests

use crate::domain::{
    AboutInfo, CpuInfo, CpuPackage, DiskCapacity, HostConfigSummary, HostHardware,
    HostHardwareSummary, HostRecord, HostSummary, ManagedObjectRef, ScsiDisk, SourceError,
    VsanDiskInfo, VsanDiskMapping, VsanDiskResult, VsanHostConfig, VsanStorageInfo,
};
use crate::ports::InventorySource;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const TB_BLOCKS_512: u64 = 1_953_125_000;

#[derive(Default)]
pub struct FakeInventorySource {
    pub hosts: Vec<HostRecord>,
    pub fail_hosts: bool,
    pub names: HashMap<String, String>,
    pub configs: HashMap<String, VsanHostConfig>,
    pub disks: HashMap<String, Vec<VsanDiskResult>>,
    pub config_delays: HashMap<String, Duration>,
    /// vSAN system values in the order their config calls completed
    pub config_completions: Mutex<Vec<String>>,
    pub name_calls: AtomicUsize,
    pub disk_calls: AtomicUsize,
}

impl FakeInventorySource {
    pub fn with_hosts(hosts: Vec<HostRecord>) -> Self {
        Self {
            hosts,
            ..Self::default()
        }
    }

    pub fn name(mut self, value: &str, name: &str) -> Self {
        self.names.insert(value.to_string(), name.to_string());
        self
    }

    pub fn config(mut self, value: &str, config: VsanHostConfig) -> Self {
        self.configs.insert(value.to_string(), config);
        self
    }

    pub fn disks(mut self, value: &str, disks: Vec<VsanDiskResult>) -> Self {
        self.disks.insert(value.to_string(), disks);
        self
    }

    pub fn config_delay(mut self, value: &str, delay: Duration) -> Self {
        self.config_delays.insert(value.to_string(), delay);
        self
    }
}

#[async_trait]
impl InventorySource for FakeInventorySource {
    async fn list_hosts(&self) -> Result<Vec<HostRecord>, SourceError> {
        if self.fail_hosts {
            return Err(SourceError::Authentication("bad credentials".to_string()));
        }
        Ok(self.hosts.clone())
    }

    async fn retrieve_entity_name(&self, entity: &ManagedObjectRef) -> Result<String, SourceError> {
        self.name_calls.fetch_add(1, Ordering::SeqCst);
        self.names
            .get(&entity.value)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(entity.to_string()))
    }

    async fn retrieve_vsan_config(
        &self,
        vsan_system: &ManagedObjectRef,
    ) -> Result<VsanHostConfig, SourceError> {
        if let Some(delay) = self.config_delays.get(&vsan_system.value) {
            tokio::time::sleep(*delay).await;
        }
        self.config_completions
            .lock()
            .unwrap()
            .push(vsan_system.value.clone());
        self.configs
            .get(&vsan_system.value)
            .cloned()
            .ok_or_else(|| SourceError::Network(format!("timeout fetching {}", vsan_system)))
    }

    async fn query_vsan_disks(
        &self,
        vsan_system: &ManagedObjectRef,
    ) -> Result<Vec<VsanDiskResult>, SourceError> {
        self.disk_calls.fetch_add(1, Ordering::SeqCst);
        self.disks
            .get(&vsan_system.value)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(vsan_system.to_string()))
    }
}

pub fn host(name: &str) -> HostRecord {
    HostRecord {
        reference: ManagedObjectRef::new("HostSystem", &format!("host-{}", name)),
        summary: HostSummary {
            config: HostConfigSummary {
                name: name.to_string(),
                product: Some(AboutInfo {
                    name: "VMware ESXi".to_string(),
                    version: "8.0.2".to_string(),
                    build: "22380479".to_string(),
                }),
            },
            hardware: Some(HostHardwareSummary {
                vendor: "Dell Inc.".to_string(),
                model: "PowerEdge R750".to_string(),
            }),
        },
        hardware: Some(HostHardware {
            cpu_pkg: vec![CpuPackage {
                index: 0,
                description: "Intel(R) Xeon(R) Gold 6338 CPU @ 2.00GHz".to_string(),
            }],
            cpu_info: CpuInfo {
                num_cpu_packages: 2,
                num_cpu_cores: 32,
                num_cpu_threads: 64,
            },
            memory_size: 137_438_953_472,
        }),
        parent: None,
        vsan_system: None,
    }
}

pub fn in_group(mut host: HostRecord, group: &str) -> HostRecord {
    host.parent = Some(ManagedObjectRef::new("ClusterComputeResource", group));
    host
}

pub fn with_vsan(mut host: HostRecord, vsan: &str) -> HostRecord {
    host.vsan_system = Some(ManagedObjectRef::new("HostVsanSystem", vsan));
    host
}

pub fn disk(name: &str, blocks: u64, claimed: bool) -> ScsiDisk {
    ScsiDisk {
        canonical_name: name.to_string(),
        display_name: name.to_string(),
        capacity: DiskCapacity::new(512, blocks),
        vsan_disk_info: claimed.then(|| VsanDiskInfo {
            vsan_uuid: format!("52{}", name),
            format_version: 15,
        }),
    }
}

pub fn disk_group(cache: &str, capacity: &[&str]) -> VsanDiskMapping {
    VsanDiskMapping {
        ssd: disk(cache, TB_BLOCKS_512 / 4, true),
        non_ssd: capacity
            .iter()
            .map(|name| disk(name, TB_BLOCKS_512, true))
            .collect(),
    }
}

pub fn osa_config(groups: Vec<VsanDiskMapping>) -> VsanHostConfig {
    VsanHostConfig {
        enabled: Some(true),
        vsan_esa_enabled: None,
        storage_info: Some(VsanStorageInfo {
            disk_mapping: groups,
        }),
    }
}

pub fn esa_config() -> VsanHostConfig {
    VsanHostConfig {
        enabled: Some(true),
        vsan_esa_enabled: Some(true),
        storage_info: None,
    }
}

pub fn pool_disk(name: &str, claimed: bool) -> VsanDiskResult {
    VsanDiskResult {
        disk: disk(name, TB_BLOCKS_512, claimed),
        state: if claimed { "inUse" } else { "eligible" }.to_string(),
    }
}
