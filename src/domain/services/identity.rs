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

//! Host and cluster identity resolution with optional anonymization

use crate::domain::{HostRecord, InventoryWarning, ManagedObjectRef};
use crate::ports::InventorySource;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// Group names keyed by the parent reference value
///
/// A reference whose lookup failed is stored with an empty name so it is never queried twice.
#[derive(Debug, Clone, Default)]
pub struct GroupNameMap {
    names: HashMap<String, String>,
}

impl GroupNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, parent: &ManagedObjectRef, name: String) {
        self.names.insert(parent.value.clone(), name);
    }

    pub fn contains(&self, parent: &ManagedObjectRef) -> bool {
        self.names.contains_key(&parent.value)
    }

    /// Resolved name, empty when the lookup failed
    pub fn name_for(&self, parent: &ManagedObjectRef) -> Option<&str> {
        self.names.get(&parent.value).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Resolves each distinct host parent to its display name
pub struct GroupNameResolver {
    source: Arc<dyn InventorySource>,
}

impl GroupNameResolver {
    pub fn new(source: Arc<dyn InventorySource>) -> Self {
        Self { source }
    }

    /// Resolve the parents of all hosts, querying each distinct reference once
    ///
    /// # Returns
    /// * The name map and one warning per reference that could not be resolved
    pub async fn resolve(&self, hosts: &[HostRecord]) -> (GroupNameMap, Vec<InventoryWarning>) {
        let mut groups = GroupNameMap::new();
        let mut warnings = Vec::new();

        for host in hosts {
            let Some(parent) = host.parent.as_ref() else {
                continue;
            };
            if groups.contains(parent) {
                continue;
            }

            match self.source.retrieve_entity_name(parent).await {
                Ok(name) => {
                    debug!("Resolved {} to cluster {}", parent, name);
                    groups.insert(parent, name);
                }
                Err(reason) => {
                    let warning = InventoryWarning::GroupUnresolved {
                        host: host.name().to_string(),
                        group: parent.value.clone(),
                        reason,
                    };
                    warn!("Warning: {}", warning);
                    warnings.push(warning);
                    groups.insert(parent, String::new());
                }
            }
        }

        (groups, warnings)
    }
}

/// Synthetic `Cluster N` labels in first-encounter order
#[derive(Debug, Clone, Default)]
pub struct AnonymizedLabelMap {
    labels: HashMap<String, String>,
}

impl AnonymizedLabelMap {
    /// Walk hosts in order and label every distinct group name
    ///
    /// Unresolved groups carry an empty name, so they all share one label.
    pub fn build(hosts: &[HostRecord], groups: &GroupNameMap) -> Self {
        let mut map = Self::default();
        for parent in hosts.iter().filter_map(|h| h.parent.as_ref()) {
            map.assign(groups.name_for(parent).unwrap_or_default());
        }
        map
    }

    fn assign(&mut self, real: &str) {
        if self.labels.contains_key(real) {
            return;
        }
        let label = format!("Cluster {}", self.labels.len() + 1);
        self.labels.insert(real.to_string(), label);
    }

    pub fn label_for(&self, real: &str) -> Option<&str> {
        self.labels.get(real).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Display identities for every host of one run
#[derive(Debug, Clone)]
pub struct HostIdentities {
    groups: GroupNameMap,
    labels: Option<AnonymizedLabelMap>,
}

impl HostIdentities {
    /// # Arguments
    /// * `groups` - Resolved group names
    /// * `anonymize` - Build synthetic labels for hosts and groups
    /// * `hosts` - Full host list in output order
    pub fn new(groups: GroupNameMap, anonymize: bool, hosts: &[HostRecord]) -> Self {
        let labels = anonymize.then(|| AnonymizedLabelMap::build(hosts, &groups));
        Self { groups, labels }
    }

    pub fn is_anonymized(&self) -> bool {
        self.labels.is_some()
    }

    /// Hostname column: real name, or `Host {index + 1}` when anonymized
    pub fn hostname(&self, index: usize, host: &HostRecord) -> String {
        if self.is_anonymized() {
            format!("Host {}", index + 1)
        } else {
            host.name().to_string()
        }
    }

    /// Cluster column: real or synthetic name, empty when ungrouped
    pub fn group_name(&self, host: &HostRecord) -> String {
        let Some(parent) = host.parent.as_ref() else {
            return String::new();
        };
        let real = self.groups.name_for(parent).unwrap_or_default();

        match &self.labels {
            Some(labels) => labels.label_for(real).unwrap_or_default().to_string(),
            None => real.to_string(),
        }
    }
}
