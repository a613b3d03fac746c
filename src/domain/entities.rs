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

use super::errors::InventoryWarning;
use super::units::format_tib;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Reference to an object on the management server
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct ManagedObjectRef {
    /// Object type (e.g. `HostSystem`, `ClusterComputeResource`)
    #[serde(rename = "type")]
    pub kind: String,
    /// Server-assigned identifier (e.g. `domain-c7`)
    pub value: String,
}

impl ManagedObjectRef {
    pub fn new(kind: &str, value: &str) -> Self {
        Self {
            kind: kind.to_string(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ManagedObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// A hypervisor host as returned by host enumeration (read-only input)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HostRecord {
    /// Identity of the host object
    pub reference: ManagedObjectRef,
    /// Summary properties
    #[serde(default)]
    pub summary: HostSummary,
    /// Detailed hardware properties
    #[serde(default)]
    pub hardware: Option<HostHardware>,
    /// Cluster or folder that directly contains the host
    #[serde(default)]
    pub parent: Option<ManagedObjectRef>,
    /// vSAN system of the host, absent when not configured for vSAN
    #[serde(default)]
    pub vsan_system: Option<ManagedObjectRef>,
}

impl HostRecord {
    /// Configured host name
    pub fn name(&self) -> &str {
        &self.summary.config.name
    }
}

/// Host summary properties
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct HostSummary {
    #[serde(default)]
    pub config: HostConfigSummary,
    #[serde(default)]
    pub hardware: Option<HostHardwareSummary>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct HostConfigSummary {
    #[serde(default)]
    pub name: String,
    /// Hypervisor product, absent on disconnected hosts
    #[serde(default)]
    pub product: Option<AboutInfo>,
}

/// Product information for the hypervisor
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AboutInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub build: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct HostHardwareSummary {
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub model: String,
}

/// Detailed hardware properties
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct HostHardware {
    /// One entry per physical CPU package
    #[serde(default)]
    pub cpu_pkg: Vec<CpuPackage>,
    #[serde(default)]
    pub cpu_info: CpuInfo,
    /// Physical memory in bytes
    #[serde(default)]
    pub memory_size: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CpuPackage {
    #[serde(default)]
    pub index: u16,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CpuInfo {
    #[serde(default)]
    pub num_cpu_packages: u16,
    #[serde(default)]
    pub num_cpu_cores: u16,
    #[serde(default)]
    pub num_cpu_threads: u16,
}

/// vSAN configuration of a single host
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct VsanHostConfig {
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Set and true when the host runs the Express Storage Architecture
    #[serde(default)]
    pub vsan_esa_enabled: Option<bool>,
    /// Disk-group layout, only meaningful for the Original Storage Architecture
    #[serde(default)]
    pub storage_info: Option<VsanStorageInfo>,
}

impl VsanHostConfig {
    pub fn is_esa(&self) -> bool {
        self.vsan_esa_enabled == Some(true)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct VsanStorageInfo {
    #[serde(default)]
    pub disk_mapping: Vec<VsanDiskMapping>,
}

/// One OSA disk group: exactly one cache SSD plus its capacity disks
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VsanDiskMapping {
    pub ssd: ScsiDisk,
    #[serde(default)]
    pub non_ssd: Vec<ScsiDisk>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ScsiDisk {
    #[serde(default)]
    pub canonical_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub capacity: DiskCapacity,
    /// Cluster membership metadata, populated only for disks claimed by vSAN
    #[serde(default)]
    pub vsan_disk_info: Option<VsanDiskInfo>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskCapacity {
    #[serde(default)]
    pub block_size: u32,
    #[serde(default)]
    pub block: u64,
}

impl DiskCapacity {
    pub fn new(block_size: u32, block: u64) -> Self {
        Self { block_size, block }
    }

    /// Raw capacity in bytes
    pub fn bytes(&self) -> u64 {
        u64::from(self.block_size).saturating_mul(self.block)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct VsanDiskInfo {
    #[serde(default)]
    pub vsan_uuid: String,
    #[serde(default)]
    pub format_version: u32,
}

/// One entry of a vSAN disk query
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VsanDiskResult {
    pub disk: ScsiDisk,
    #[serde(default)]
    pub state: String,
}

/// vSAN disk architecture active on a host
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageArchitecture {
    /// Not a vSAN contributor
    #[default]
    None,
    /// Original Storage Architecture (disk groups with a cache tier)
    Osa,
    /// Express Storage Architecture (flat disk pool, no cache tier)
    Esa,
}

impl StorageArchitecture {
    /// Label written to the vSAN Type column
    pub fn label(&self) -> &'static str {
        match self {
            StorageArchitecture::None => "",
            StorageArchitecture::Osa => "OSA",
            StorageArchitecture::Esa => "ESA",
        }
    }
}

impl fmt::Display for StorageArchitecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregated vSAN disk facts for one host
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct StorageFacts {
    pub architecture: StorageArchitecture,
    /// Disks counted toward usable capacity
    pub capacity_disks: u32,
    /// Cache-tier disks (always 0 under ESA)
    pub cache_disks: u32,
    /// Raw bytes of capacity-tier disks only
    pub capacity_bytes: u64,
}

impl StorageFacts {
    /// Facts for a host that does not contribute to a vSAN cluster
    pub fn none() -> Self {
        Self::default()
    }

    pub fn empty(architecture: StorageArchitecture) -> Self {
        Self {
            architecture,
            ..Self::default()
        }
    }
}

/// Column headers of the inventory table, in output order
pub const INVENTORY_HEADERS: [&str; 13] = [
    "Hostname",
    "Cluster",
    "Server Model",
    "ESXi Version",
    "CPU Model",
    "Socket Count",
    "Cores per Socket",
    "Total Cores",
    "Memory GB",
    "vSAN Type",
    "vSAN Capacity Disks",
    "vSAN Cache Disks",
    "vSAN Capacity TiB",
];

/// One flattened output row per host
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InventoryRow {
    pub hostname: String,
    pub cluster: String,
    pub server_model: String,
    pub esxi_version: String,
    pub cpu_model: String,
    pub socket_count: u16,
    pub cores_per_socket: u16,
    pub total_cores: u16,
    pub memory_gb: u64,
    pub storage: StorageFacts,
}

impl InventoryRow {
    /// Render the row as text fields matching `INVENTORY_HEADERS`
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.hostname.clone(),
            self.cluster.clone(),
            self.server_model.clone(),
            self.esxi_version.clone(),
            self.cpu_model.clone(),
            self.socket_count.to_string(),
            self.cores_per_socket.to_string(),
            self.total_cores.to_string(),
            self.memory_gb.to_string(),
            self.storage.architecture.label().to_string(),
            self.storage.capacity_disks.to_string(),
            self.storage.cache_disks.to_string(),
            format_tib(self.storage.capacity_bytes),
        ]
    }
}

/// Result of one inventory run
#[derive(Debug, Clone, Default)]
pub struct InventoryReport {
    /// Rows in host-list order
    pub rows: Vec<InventoryRow>,
    /// Recoverable failures encountered while building the rows
    pub warnings: Vec<InventoryWarning>,
}

/// Options that change how rows are built
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Replace host and cluster names with synthetic labels
    pub anonymize: bool,
    /// Dump raw vSAN configuration per host at debug level
    pub debug: bool,
    /// Number of hosts whose storage is aggregated at the same time
    pub concurrency: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            anonymize: false,
            debug: false,
            concurrency: 1,
        }
    }
}

/// Where host data is read from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Inventory gateway reached over HTTPS
    #[default]
    Http,
    /// JSON snapshot on disk
    Snapshot,
}

/// Configuration for the inventory source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Snapshot document path
    pub snapshot: Option<PathBuf>,
    /// Gateway base URL
    pub url: Option<String>,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Accept self-signed certificates
    pub insecure: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries for transport failures
    pub retry_count: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            snapshot: None,
            url: None,
            user: None,
            password: None,
            insecure: true,
            timeout_secs: 30,
            retry_count: 2,
        }
    }
}

/// Configuration for the output sink
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// CSV path, `-` for stdout
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("hosts_cpu.csv"),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub inventory: InventoryConfig,
}
