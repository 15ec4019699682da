//! Service identity discovery from Docker container labels

use crate::client::DockerClient;
use async_trait::async_trait;
use serde::Deserialize;
use shim_core::{DiscoveryError, Resolver, ServiceIdentity};
use std::collections::HashMap;
use tracing::debug;

/// Label holding the service name
pub const SERVICE_NAME_LABEL: &str = "ServiceName";
/// Label holding the environment name
pub const ENVIRONMENT_NAME_LABEL: &str = "EnvironmentName";
/// Label holding the proxy mode
pub const PROXY_MODE_LABEL: &str = "ProxyMode";

const DEFAULT_PROXY_MODE: &str = "http";

/// Subset of a `GET /containers/json` entry
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSummary {
    pub id: String,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub ports: Vec<PortBinding>,
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
}

impl ContainerSummary {
    /// Whether this container publishes `port` on the host
    pub fn publishes(&self, port: u16) -> bool {
        self.ports.iter().any(|p| p.public_port == Some(port))
    }

    fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .as_ref()
            .and_then(|labels| labels.get(name))
            .map(|value| value.as_str())
    }

    fn display_name(&self) -> &str {
        self.names
            .first()
            .map(|n| n.trim_start_matches('/'))
            .unwrap_or(self.id.as_str())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortBinding {
    #[serde(rename = "IP", default)]
    pub ip: Option<String>,
    pub private_port: u16,
    #[serde(default)]
    pub public_port: Option<u16>,
    #[serde(rename = "Type", default)]
    pub protocol: String,
}

/// Find the container publishing `port` and read its identity labels.
///
/// `ServiceName` and `EnvironmentName` are required; `ProxyMode` defaults
/// to `http`.
pub fn identity_for_port(
    containers: &[ContainerSummary],
    port: u16,
) -> Result<ServiceIdentity, DiscoveryError> {
    let container = containers
        .iter()
        .find(|c| c.publishes(port))
        .ok_or(DiscoveryError::NotFound(port))?;

    let required = |label: &'static str| {
        container
            .label(label)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or_else(|| DiscoveryError::MetadataIncomplete {
                port,
                container: container.display_name().to_string(),
                label,
            })
    };

    Ok(ServiceIdentity {
        service_name: required(SERVICE_NAME_LABEL)?,
        environment_name: required(ENVIRONMENT_NAME_LABEL)?,
        proxy_mode: container
            .label(PROXY_MODE_LABEL)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_PROXY_MODE)
            .to_string(),
    })
}

/// DockerDiscovery resolves a published port to the container's identity
pub struct DockerDiscovery {
    client: DockerClient,
}

impl DockerDiscovery {
    /// Create a discovery client on top of a Docker client
    pub fn new(client: DockerClient) -> Self {
        Self { client }
    }

    /// List running containers
    pub async fn list_containers(&self) -> Result<Vec<ContainerSummary>, DiscoveryError> {
        let containers: Vec<ContainerSummary> = self.client.get_json("/containers/json").await?;
        debug!("Discovered {} running containers", containers.len());
        Ok(containers)
    }
}

#[async_trait]
impl Resolver for DockerDiscovery {
    async fn container_fields_for_port(
        &self,
        port: u16,
    ) -> Result<ServiceIdentity, DiscoveryError> {
        let containers = self.list_containers().await?;
        let identity = identity_for_port(&containers, port)?;
        debug!(
            port,
            service = %identity.service_name,
            environment = %identity.environment_name,
            mode = %identity.proxy_mode,
            "Resolved container identity"
        );
        Ok(identity)
    }
}
