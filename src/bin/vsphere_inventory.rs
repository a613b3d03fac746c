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

use clap::Parser;
use log::{error, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use vsphere_inventory::{
    AppConfig, ConfigurationProvider, InventoryError, InventoryReportingService, ServiceContainer,
    SourceConfig, SourceKind, TomlConfigurationProvider,
};

#[derive(Parser, Debug)]
#[command(
    name = "vsphere_inventory",
    version,
    about = "Inventory host hardware and vSAN capacity into a CSV file"
)]
struct Opt {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Inventory gateway hostname or URL
    #[arg(long)]
    host: Option<String>,

    /// Gateway username
    #[arg(long)]
    user: Option<String>,

    /// Gateway password (prompted if not provided)
    #[arg(long, env = "VSPHERE_INVENTORY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Read hosts from a JSON snapshot instead of the gateway
    #[arg(long, conflicts_with = "host")]
    snapshot: Option<PathBuf>,

    /// Output CSV file path, `-` for stdout [default: hosts_cpu.csv]
    #[arg(long)]
    output: Option<PathBuf>,

    /// Allow self-signed TLS certificates [default: true]
    #[arg(long)]
    insecure: Option<bool>,

    /// Replace hostnames and cluster names with synthetic labels
    #[arg(long)]
    anonymize: bool,

    /// Log raw vSAN configuration per host
    #[arg(long)]
    debug: bool,

    /// Number of hosts whose vSAN data is queried at the same time
    #[arg(long)]
    concurrency: Option<usize>,
}

impl Opt {
    /// Command-line flags take precedence over the configuration file
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(ref host) = self.host {
            config.source.kind = SourceKind::Http;
            config.source.url = Some(host.clone());
        }
        if let Some(ref snapshot) = self.snapshot {
            config.source.kind = SourceKind::Snapshot;
            config.source.snapshot = Some(snapshot.clone());
        }
        if let Some(ref user) = self.user {
            config.source.user = Some(user.clone());
        }
        if let Some(ref password) = self.password {
            config.source.password = Some(password.clone());
        }
        if let Some(insecure) = self.insecure {
            config.source.insecure = insecure;
        }
        if let Some(ref output) = self.output {
            config.output.path = output.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.inventory.concurrency = concurrency;
        }
        config.inventory.anonymize |= self.anonymize;
        config.inventory.debug |= self.debug;
    }
}

fn prompt_password(user: &str) -> Result<String, InventoryError> {
    dialoguer::Password::new()
        .with_prompt(format!("Password for {}", user))
        .allow_empty_password(true)
        .interact()
        .map_err(|e| InventoryError::Configuration(format!("Error reading password: {}", e)))
}

/// User whose password must be prompted; an empty password counts as missing
fn password_prompt_user(source: &SourceConfig) -> Option<&str> {
    let has_password = source.password.as_deref().is_some_and(|p| !p.is_empty());
    match source.kind {
        SourceKind::Http if !has_password => source.user.as_deref(),
        _ => None,
    }
}

async fn run(opt: Opt) -> Result<(usize, PathBuf), InventoryError> {
    let mut provider = match opt.config {
        Some(ref path) => TomlConfigurationProvider::load(path).await?,
        None => TomlConfigurationProvider::default(),
    };
    opt.apply_to(provider.config_mut());

    let source = provider.get_source_config().await?;
    if let Some(user) = password_prompt_user(&source) {
        let password = prompt_password(user)?;
        provider.config_mut().source.password = Some(password);
    }

    let container = ServiceContainer::from_provider(&provider).await?;
    let service = container.create_inventory_reporting_service().await?;

    let report = service.collect(&container.config().inventory).await?;
    if !report.warnings.is_empty() {
        warn!(
            "{} warnings; affected rows contain default values",
            report.warnings.len()
        );
    }

    let written = service.export(&report).await?;
    Ok((written, container.config().output.path.clone()))
}

#[tokio::main]
async fn main() -> ExitCode {
    let opt = Opt::parse();

    let default_filter = if opt.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(opt).await {
        Ok((written, path)) => {
            eprintln!("Wrote {} hosts to {}", written, path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
