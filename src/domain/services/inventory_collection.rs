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

use super::identity::{GroupNameResolver, HostIdentities};
use super::rows::InventoryRowBuilder;
use super::storage::StorageTopologyAggregator;
use crate::domain::{InventoryConfig, InventoryError, InventoryReport, INVENTORY_HEADERS};
use crate::ports::{InventoryReportingService, InventorySource, RowExporter};
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

/// Domain service that implements inventory collection
///
/// This service coordinates host enumeration, group name resolution and vSAN
/// aggregation, and assembles one row per host in host-list order.
pub struct InventoryCollectionService {
    /// Management server data (HTTPS gateway, snapshot)
    source: Arc<dyn InventorySource>,
    /// Output sink for the collected rows
    exporter: Arc<dyn RowExporter>,
}

impl InventoryCollectionService {
    /// Create a new inventory collection service
    ///
    /// # Arguments
    /// * `source` - Inventory source to query
    /// * `exporter` - Sink that receives the rows
    pub fn new(source: Arc<dyn InventorySource>, exporter: Arc<dyn RowExporter>) -> Self {
        Self { source, exporter }
    }
}

#[async_trait]
impl InventoryReportingService for InventoryCollectionService {
    async fn collect(&self, config: &InventoryConfig) -> Result<InventoryReport, InventoryError> {
        let hosts = self
            .source
            .list_hosts()
            .await
            .map_err(InventoryError::HostEnumeration)?;
        info!("Retrieved {} hosts", hosts.len());

        let (groups, mut warnings) = GroupNameResolver::new(Arc::clone(&self.source))
            .resolve(&hosts)
            .await;
        let identities = HostIdentities::new(groups, config.anonymize, &hosts);

        let assessments = StorageTopologyAggregator::new(Arc::clone(&self.source), config.debug)
            .aggregate_all(&hosts, config.concurrency)
            .await?;

        let builder = InventoryRowBuilder::new(&identities);
        let mut rows = Vec::with_capacity(hosts.len());
        for (index, (host, assessment)) in hosts.iter().zip(assessments).enumerate() {
            warnings.extend(assessment.warning);
            rows.push(builder.build(index, host, &assessment.facts));
        }

        if !warnings.is_empty() {
            info!("{} hosts or clusters were degraded to defaults", warnings.len());
        }

        Ok(InventoryReport { rows, warnings })
    }

    async fn export(&self, report: &InventoryReport) -> Result<usize, InventoryError> {
        let written = self.exporter.export(&INVENTORY_HEADERS, &report.rows).await?;
        info!("Exported {} rows to {}", written, self.exporter.describe());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::testing::{
        disk_group, esa_config, host, in_group, osa_config, pool_disk, with_vsan,
        FakeInventorySource,
    };
    use crate::domain::{ExportError, InventoryRow, InventoryWarning, StorageArchitecture};
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingExporter {
        written: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl RowExporter for RecordingExporter {
        async fn export(
            &self,
            headers: &[&str],
            rows: &[InventoryRow],
        ) -> Result<usize, ExportError> {
            let mut written = self.written.lock().unwrap();
            written.push(headers.iter().map(|h| h.to_string()).collect());
            written.extend(rows.iter().map(InventoryRow::to_record));
            Ok(rows.len())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    fn fleet() -> FakeInventorySource {
        let hosts = vec![
            with_vsan(in_group(host("esx01"), "domain-c7"), "vsan-1"),
            with_vsan(in_group(host("esx02"), "domain-c7"), "vsan-2"),
            with_vsan(in_group(host("esx03"), "domain-c9"), "vsan-3"),
            host("standalone"),
        ];
        FakeInventorySource::with_hosts(hosts)
            .name("domain-c7", "Production")
            .name("domain-c9", "Edge")
            .config(
                "vsan-1",
                osa_config(vec![disk_group("ssd0", &["hdd0", "hdd1", "hdd2", "hdd3"])]),
            )
            .config("vsan-3", esa_config())
            .disks(
                "vsan-3",
                vec![pool_disk("nvme0", true), pool_disk("nvme1", false)],
            )
    }

    #[tokio::test]
    async fn test_collect_fleet() {
        let source = Arc::new(fleet());
        let exporter = Arc::new(RecordingExporter::default());
        let service = InventoryCollectionService::new(source.clone(), exporter.clone());

        let report = service.collect(&InventoryConfig::default()).await.unwrap();

        assert_eq!(report.rows.len(), 4);
        assert_eq!(source.name_calls.load(Ordering::SeqCst), 2);

        let esx01 = &report.rows[0];
        assert_eq!(esx01.cluster, "Production");
        assert_eq!(esx01.storage.architecture, StorageArchitecture::Osa);
        assert_eq!(esx01.storage.cache_disks, 1);
        assert_eq!(esx01.storage.capacity_disks, 4);
        assert_eq!(esx01.to_record()[12], "3.6");

        // vsan-2 has no configuration: degraded but present
        let esx02 = &report.rows[1];
        assert_eq!(esx02.hostname, "esx02");
        assert_eq!(esx02.cluster, "Production");
        assert_eq!(esx02.storage.architecture, StorageArchitecture::None);
        assert_eq!(report.warnings.len(), 1);
        assert!(matches!(
            &report.warnings[0],
            InventoryWarning::StorageConfigUnavailable { host, .. } if host == "esx02"
        ));

        let esx03 = &report.rows[2];
        assert_eq!(esx03.storage.architecture, StorageArchitecture::Esa);
        assert_eq!(esx03.storage.capacity_disks, 1);
        assert_eq!(esx03.storage.cache_disks, 0);

        assert_eq!(report.rows[3].cluster, "");
        assert_eq!(report.rows[3].storage.architecture.label(), "");

        let written = service.export(&report).await.unwrap();
        assert_eq!(written, 4);
        let recorded = exporter.written.lock().unwrap();
        assert_eq!(recorded.len(), 5);
        assert_eq!(recorded[0][0], "Hostname");
        assert_eq!(recorded[0][12], "vSAN Capacity TiB");
    }

    #[tokio::test]
    async fn test_collect_anonymized() {
        let service = InventoryCollectionService::new(
            Arc::new(fleet()),
            Arc::new(RecordingExporter::default()),
        );
        let config = InventoryConfig {
            anonymize: true,
            ..InventoryConfig::default()
        };

        let report = service.collect(&config).await.unwrap();
        let names: Vec<_> = report
            .rows
            .iter()
            .map(|r| (r.hostname.as_str(), r.cluster.as_str()))
            .collect();

        assert_eq!(
            names,
            vec![
                ("Host 1", "Cluster 1"),
                ("Host 2", "Cluster 1"),
                ("Host 3", "Cluster 2"),
                ("Host 4", ""),
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_collect_matches_sequential() {
        let sequential = InventoryCollectionService::new(
            Arc::new(fleet()),
            Arc::new(RecordingExporter::default()),
        )
        .collect(&InventoryConfig::default())
        .await
        .unwrap();

        let concurrent = InventoryCollectionService::new(
            Arc::new(fleet()),
            Arc::new(RecordingExporter::default()),
        )
        .collect(&InventoryConfig {
            concurrency: 3,
            ..InventoryConfig::default()
        })
        .await
        .unwrap();

        assert_eq!(sequential.rows, concurrent.rows);
        assert_eq!(sequential.warnings, concurrent.warnings);
    }

    #[tokio::test]
    async fn test_host_enumeration_failure_is_fatal() {
        let mut source = fleet();
        source.fail_hosts = true;
        let exporter = Arc::new(RecordingExporter::default());
        let service = InventoryCollectionService::new(Arc::new(source), exporter.clone());

        let err = service.collect(&InventoryConfig::default()).await.unwrap_err();
        assert!(matches!(err, InventoryError::HostEnumeration(_)));
        assert!(exporter.written.lock().unwrap().is_empty());
    }
}
