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

use std::fmt;
use thiserror::Error;

/// Errors raised by a single call against the inventory source
///
/// These are per-entity failures. Apart from host enumeration they never abort a run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SourceError {
    /// Transport-level failure (connection refused, timeout, TLS)
    #[error("Network operation failed: {0}")]
    Network(String),
    /// Credentials rejected or permission denied
    #[error("Authentication failed: {0}")]
    Authentication(String),
    /// Referenced object does not exist or is not visible
    #[error("Object not found: {0}")]
    NotFound(String),
    /// Response could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// Local I/O failure (snapshot files)
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors raised while writing rows to the output sink
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExportError {
    /// Output sink could not be created or written
    #[error("Output error: {0}")]
    Io(String),
    /// Record encoding failed
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Fatal errors that abort an inventory run
#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    /// Invalid or incomplete configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    /// The inventory source could not be reached or opened
    #[error("Error connecting to inventory source: {0}")]
    Connection(#[source] SourceError),
    /// The host list itself could not be retrieved
    #[error("Error retrieving hosts: {0}")]
    HostEnumeration(#[source] SourceError),
    /// Output sink failure
    #[error(transparent)]
    Export(#[from] ExportError),
    /// A worker task failed unexpectedly
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A recoverable per-entity failure that degraded part of one or more rows
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryWarning {
    /// A group back-reference could not be resolved to a name
    GroupUnresolved {
        host: String,
        group: String,
        reason: SourceError,
    },
    /// The host's vSAN configuration could not be fetched
    StorageConfigUnavailable { host: String, reason: SourceError },
    /// The host's vSAN disk list could not be queried
    DiskQueryFailed { host: String, reason: SourceError },
}

impl InventoryWarning {
    /// Host the warning was raised for
    pub fn host(&self) -> &str {
        match self {
            InventoryWarning::GroupUnresolved { host, .. }
            | InventoryWarning::StorageConfigUnavailable { host, .. }
            | InventoryWarning::DiskQueryFailed { host, .. } => host,
        }
    }
}

impl fmt::Display for InventoryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryWarning::GroupUnresolved {
                host,
                group,
                reason,
            } => write!(
                f,
                "could not retrieve cluster name {} for {}: {}",
                group, host, reason
            ),
            InventoryWarning::StorageConfigUnavailable { host, reason } => {
                write!(f, "could not retrieve vSAN config for {}: {}", host, reason)
            }
            InventoryWarning::DiskQueryFailed { host, reason } => {
                write!(f, "could not query vSAN disks for {}: {}", host, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display_names_host() {
        let warning = InventoryWarning::StorageConfigUnavailable {
            host: "esx01.lab".to_string(),
            reason: SourceError::Network("connection reset".to_string()),
        };
        assert_eq!(warning.host(), "esx01.lab");
        assert_eq!(
            warning.to_string(),
            "could not retrieve vSAN config for esx01.lab: Network operation failed: connection reset"
        );
    }

    #[test]
    fn test_export_error_converts_to_inventory_error() {
        let err: InventoryError = ExportError::Io("disk full".to_string()).into();
        assert!(matches!(err, InventoryError::Export(_)));
        assert_eq!(err.to_string(), "Output error: disk full");
    }
}
