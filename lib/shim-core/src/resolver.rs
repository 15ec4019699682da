//! Discovery of the service identity behind a published port

use crate::{DiscoveryError, ServiceIdentity};
use async_trait::async_trait;
use std::time::Duration;

/// Looks up the service identity of the container bound to a port
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Fetch the identity for the container publishing `port`
    async fn container_fields_for_port(
        &self,
        port: u16,
    ) -> std::result::Result<ServiceIdentity, DiscoveryError>;

    /// Wait for a freshly created container to become visible.
    ///
    /// Sources with an event stream may wait on it instead, but must still
    /// fall back to `delay` when they cannot.
    async fn settle(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
