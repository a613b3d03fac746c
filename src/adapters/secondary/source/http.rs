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

//! HTTPS inventory gateway source

use crate::domain::{HostRecord, ManagedObjectRef, SourceError, VsanDiskResult, VsanHostConfig};
use crate::ports::InventorySource;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Basic-auth credentials for the gateway
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct EntityName {
    name: String,
}

/// Inventory source that reads host data from a JSON-over-HTTPS gateway
///
/// Endpoints, relative to the base URL:
/// * `GET /hosts`
/// * `GET /entities/{ref}/name`
/// * `GET /vsan/{ref}/config`
/// * `GET /vsan/{ref}/disks`
pub struct HttpInventorySource {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
    /// Number of retry attempts for transport failures
    retry_count: u32,
}

impl HttpInventorySource {
    /// Create a new HTTP inventory source
    ///
    /// # Arguments
    /// * `base_url` - Gateway URL or bare hostname (`https://` is assumed)
    /// * `credentials` - Basic-auth credentials, if the gateway requires them
    /// * `timeout` - HTTP request timeout
    /// * `insecure` - Whether to accept self-signed TLS certificates
    /// * `retry_count` - Retries for transport failures
    pub fn new(
        base_url: &str,
        credentials: Option<Credentials>,
        timeout: Duration,
        insecure: bool,
        retry_count: u32,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(|e| SourceError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            credentials,
            retry_count,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a JSON document, retrying transport failures with linear back-off
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        let url = self.endpoint(path);
        let mut attempt = 0;

        loop {
            match self.get_once(&url).await {
                Err(SourceError::Network(msg)) if attempt < self.retry_count => {
                    attempt += 1;
                    warn!("Request to {url} failed on attempt {attempt}, retrying: {msg}");
                    tokio::time::sleep(Duration::from_millis(100 * attempt as u64)).await;
                }
                result => return result,
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        debug!("GET {url}");
        let mut request = self.client.get(url).header("Accept", "application/json");

        if let Some(ref credentials) = self.credentials {
            request = request.basic_auth(&credentials.user, Some(&credentials.password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to send request: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| SourceError::InvalidResponse(format!("{url}: {e}")));
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(classify_status(status, &error_text))
    }
}

/// Turn a bare hostname into an `https://` base URL without a trailing slash
pub fn normalize_base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

fn classify_status(status: StatusCode, body: &str) -> SourceError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SourceError::Authentication(format!("HTTP {status}: {body}"))
        }
        StatusCode::NOT_FOUND => SourceError::NotFound(format!("HTTP {status}: {body}")),
        s if s.is_server_error() => SourceError::Network(format!("HTTP {status}: {body}")),
        _ => SourceError::InvalidResponse(format!("HTTP {status}: {body}")),
    }
}

#[async_trait]
impl InventorySource for HttpInventorySource {
    async fn list_hosts(&self) -> Result<Vec<HostRecord>, SourceError> {
        self.get_json("hosts").await
    }

    async fn retrieve_entity_name(&self, entity: &ManagedObjectRef) -> Result<String, SourceError> {
        let entity: EntityName = self
            .get_json(&format!("entities/{}/name", entity.value))
            .await?;
        Ok(entity.name)
    }

    async fn retrieve_vsan_config(
        &self,
        vsan_system: &ManagedObjectRef,
    ) -> Result<VsanHostConfig, SourceError> {
        self.get_json(&format!("vsan/{}/config", vsan_system.value)).await
    }

    async fn query_vsan_disks(
        &self,
        vsan_system: &ManagedObjectRef,
    ) -> Result<Vec<VsanDiskResult>, SourceError> {
        self.get_json(&format!("vsan/{}/disks", vsan_system.value)).await
    }
}
