//! gRPC over a local unix socket

use crate::client::{ControlPlane, Dialer};
use crate::{Result, ShimError};
use async_trait::async_trait;
use hyper_util::rt::TokioIo;
use shim_api::{RegistrarClient, RegistrarRequest, RegistrarResponse};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::net::UnixStream;
use tonic::transport::{Channel, Endpoint, Uri};
use tower::service_fn;
use tracing::{debug, info};

/// Dials the control plane on a unix socket
#[derive(Clone, Debug)]
pub struct UnixSocketDialer {
    path: PathBuf,
    timeout: Duration,
}

impl UnixSocketDialer {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dial_error(&self, reason: impl Into<String>) -> ShimError {
        ShimError::Dial {
            target: self.target(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Dialer for UnixSocketDialer {
    type Conn = GrpcConnection;

    async fn dial(&self) -> Result<GrpcConnection> {
        info!(socket = %self.path.display(), "Connecting on Unix socket");

        // The authority is ignored; the connector always opens `path`.
        let path = self.path.clone();
        let endpoint = Endpoint::from_static("http://[::]:50051").connect_timeout(self.timeout);
        let connect = endpoint.connect_with_connector(service_fn(move |_: Uri| {
            let path = path.clone();
            async move {
                let stream = UnixStream::connect(path).await?;
                Ok::<_, std::io::Error>(TokioIo::new(stream))
            }
        }));

        let channel = tokio::time::timeout(self.timeout, connect)
            .await
            .map_err(|_| self.dial_error(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| self.dial_error(e.to_string()))?;

        Ok(GrpcConnection {
            client: RegistrarClient::new(channel),
        })
    }

    fn target(&self) -> String {
        format!("unix://{}", self.path.display())
    }
}

/// One open gRPC channel to the control plane
pub struct GrpcConnection {
    client: RegistrarClient<Channel>,
}

#[async_trait]
impl ControlPlane for GrpcConnection {
    async fn register(&mut self, request: RegistrarRequest) -> Result<RegistrarResponse> {
        let response = self.client.register(request).await?;
        Ok(response.into_inner())
    }

    fn close(self) {
        debug!("Closing control plane connection");
        drop(self.client);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target() {
        let dialer = UnixSocketDialer::new("/var/run/envoy-shim.sock", Duration::from_secs(5));
        assert_eq!(dialer.target(), "unix:///var/run/envoy-shim.sock");
        assert_eq!(dialer.path(), Path::new("/var/run/envoy-shim.sock"));
    }

    #[tokio::test]
    async fn test_dial_missing_socket_fails() {
        let path = std::env::temp_dir()
            .join(format!("envoy-shim-missing-{}.sock", std::process::id()));
        let dialer = UnixSocketDialer::new(&path, Duration::from_millis(500));

        let result = dialer.dial().await;
        assert!(matches!(result, Err(ShimError::Dial { .. })));
    }
}
