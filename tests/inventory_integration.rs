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

use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use serde_json::{json, Value};
use vsphere_inventory::{
    AppConfig, InventoryError, InventoryReportingService, InventoryWarning, ServiceContainer,
    SourceKind,
};

const CPU: &str = "Intel(R) Xeon(R) Gold 6338 CPU @ 2.00GHz";
const TB_BLOCKS: u64 = 1_953_125_000;

fn host(name: &str, parent: Option<&str>, vsan: Option<&str>) -> Value {
    json!({
        "reference": {"type": "HostSystem", "value": format!("host-{}", name)},
        "summary": {
            "config": {"name": name, "product": {"name": "VMware ESXi", "version": "8.0.2"}},
            "hardware": {"vendor": "Dell Inc.", "model": "PowerEdge R750"}
        },
        "hardware": {
            "cpu_pkg": [{"index": 0, "description": CPU}],
            "cpu_info": {"num_cpu_packages": 2, "num_cpu_cores": 32, "num_cpu_threads": 64},
            "memory_size": 137_438_953_472u64
        },
        "parent": parent.map(|p| json!({"type": "ClusterComputeResource", "value": p})),
        "vsan_system": vsan.map(|v| json!({"type": "HostVsanSystem", "value": v}))
    })
}

fn disk(name: &str, claimed: bool) -> Value {
    let mut disk = json!({
        "canonical_name": name,
        "capacity": {"block_size": 512, "block": TB_BLOCKS}
    });
    if claimed {
        disk["vsan_disk_info"] = json!({"vsan_uuid": format!("52-{}", name), "format_version": 15});
    }
    disk
}

fn fleet_snapshot() -> Value {
    json!({
        "hosts": [
            host("esx01", Some("domain-c7"), Some("vsan-1")),
            host("esx02", Some("domain-c7"), Some("vsan-2")),
            host("esx03", Some("domain-c9"), Some("vsan-3")),
            {"reference": {"type": "HostSystem", "value": "host-esx04"},
             "summary": {"config": {"name": "esx04"}}},
            host("esx05", Some("domain-c404"), None)
        ],
        "entities": {"domain-c7": "Production", "domain-c9": "Edge"},
        "vsan_systems": {
            "vsan-1": {
                "config": {
                    "enabled": true,
                    "storage_info": {"disk_mapping": [{
                        "ssd": disk("ssd0", true),
                        "non_ssd": [disk("hdd0", true), disk("hdd1", true), disk("hdd2", true), disk("hdd3", true)]
                    }]}
                }
            },
            "vsan-3": {
                "config": {"enabled": true, "vsan_esa_enabled": true},
                "disks": [
                    {"disk": disk("nvme0", true), "state": "inUse"},
                    {"disk": disk("nvme1", true), "state": "inUse"},
                    {"disk": disk("nvme2", false), "state": "eligible"}
                ]
            }
        }
    })
}

fn snapshot_config(temp: &TempDir, anonymize: bool) -> AppConfig {
    let snapshot = temp.child("inventory.json");
    snapshot
        .write_str(&serde_json::to_string_pretty(&fleet_snapshot()).unwrap())
        .unwrap();

    let mut config = AppConfig::default();
    config.source.kind = SourceKind::Snapshot;
    config.source.snapshot = Some(snapshot.path().to_path_buf());
    config.output.path = temp.child("out").child("hosts_cpu.csv").path().to_path_buf();
    config.inventory.anonymize = anonymize;
    config
}

#[tokio::test]
async fn test_snapshot_to_csv() {
    let temp = TempDir::new().unwrap();
    let container = ServiceContainer::new(snapshot_config(&temp, false));
    let service = container.create_inventory_reporting_service().await.unwrap();

    let report = service.collect(&container.config().inventory).await.unwrap();
    let written = service.export(&report).await.unwrap();
    assert_eq!(written, 5);

    assert_eq!(report.warnings.len(), 2);
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        InventoryWarning::StorageConfigUnavailable { host, .. } if host == "esx02"
    )));
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        InventoryWarning::GroupUnresolved { group, .. } if group == "domain-c404"
    )));

    let output = temp.child("out").child("hosts_cpu.csv");
    output.assert(predicate::path::exists());

    let text = std::fs::read_to_string(output.path()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Hostname,Cluster,Server Model,ESXi Version,CPU Model,Socket Count,Cores per Socket,Total Cores,Memory GB,vSAN Type,vSAN Capacity Disks,vSAN Cache Disks,vSAN Capacity TiB",
            "esx01,Production,PowerEdge R750,8.0.2,Intel(R) Xeon(R) Gold 6338 CPU @ 2.00GHz,2,16,32,128,OSA,4,1,3.6",
            "esx02,Production,PowerEdge R750,8.0.2,Intel(R) Xeon(R) Gold 6338 CPU @ 2.00GHz,2,16,32,128,,0,0,0.0",
            "esx03,Edge,PowerEdge R750,8.0.2,Intel(R) Xeon(R) Gold 6338 CPU @ 2.00GHz,2,16,32,128,ESA,2,0,1.8",
            "esx04,,,,,0,0,0,0,,0,0,0.0",
            "esx05,,PowerEdge R750,8.0.2,Intel(R) Xeon(R) Gold 6338 CPU @ 2.00GHz,2,16,32,128,,0,0,0.0",
        ]
    );
}

#[tokio::test]
async fn test_anonymized_snapshot_hides_names() {
    let temp = TempDir::new().unwrap();
    let container = ServiceContainer::new(snapshot_config(&temp, true));
    let service = container.create_inventory_reporting_service().await.unwrap();

    let report = service.collect(&container.config().inventory).await.unwrap();
    service.export(&report).await.unwrap();

    let output = temp.child("out").child("hosts_cpu.csv");
    output.assert(predicate::str::contains("Host 1,Cluster 1,"));
    output.assert(predicate::str::contains("Host 2,Cluster 1,"));
    output.assert(predicate::str::contains("Host 3,Cluster 2,"));
    output.assert(predicate::str::contains("Host 4,,"));
    output.assert(predicate::str::contains("Host 5,Cluster 3,"));
    output.assert(predicate::str::contains("esx0").not());
    output.assert(predicate::str::contains("Production").not());
}

#[tokio::test]
async fn test_unwritable_output_is_fatal() {
    let temp = TempDir::new().unwrap();
    let mut config = snapshot_config(&temp, false);
    config.output.path = temp.path().to_path_buf();

    let container = ServiceContainer::new(config);
    let service = container.create_inventory_reporting_service().await.unwrap();
    let report = service.collect(&container.config().inventory).await.unwrap();

    let err = service.export(&report).await.unwrap_err();
    assert!(matches!(err, InventoryError::Export(_)));
}
