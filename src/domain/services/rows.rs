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

use super::identity::HostIdentities;
use crate::domain::units::{bytes_to_gib, cores_per_socket};
use crate::domain::{HostRecord, InventoryRow, StorageFacts};

/// Merges host properties, resolved identity and storage facts into one row
pub struct InventoryRowBuilder<'a> {
    identities: &'a HostIdentities,
}

impl<'a> InventoryRowBuilder<'a> {
    pub fn new(identities: &'a HostIdentities) -> Self {
        Self { identities }
    }

    /// Build the row for the host at `index` in the host list
    ///
    /// Missing summary or hardware data yields empty strings and zeros.
    pub fn build(&self, index: usize, host: &HostRecord, storage: &StorageFacts) -> InventoryRow {
        let server_model = host
            .summary
            .hardware
            .as_ref()
            .map(|hw| hw.model.clone())
            .unwrap_or_default();

        let esxi_version = host
            .summary
            .config
            .product
            .as_ref()
            .map(|product| product.version.clone())
            .unwrap_or_default();

        let (cpu_model, socket_count, total_cores, memory_gb) = match &host.hardware {
            Some(hardware) => (
                hardware
                    .cpu_pkg
                    .first()
                    .map(|pkg| pkg.description.clone())
                    .unwrap_or_default(),
                hardware.cpu_info.num_cpu_packages,
                hardware.cpu_info.num_cpu_cores,
                bytes_to_gib(hardware.memory_size),
            ),
            None => (String::new(), 0, 0, 0),
        };

        InventoryRow {
            hostname: self.identities.hostname(index, host),
            cluster: self.identities.group_name(host),
            server_model,
            esxi_version,
            cpu_model,
            socket_count,
            cores_per_socket: cores_per_socket(total_cores, socket_count),
            total_cores,
            memory_gb,
            storage: *storage,
        }
    }
}
