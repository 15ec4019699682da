//! Docker container discovery for the envoy shim
pub mod client;
pub mod discovery;

pub use client::DockerClient;
pub use discovery::{
    identity_for_port, ContainerSummary, DockerDiscovery, PortBinding, ENVIRONMENT_NAME_LABEL,
    PROXY_MODE_LABEL, SERVICE_NAME_LABEL,
};
