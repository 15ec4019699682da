//! Minimal Docker Engine API client over the local unix socket

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::{header, Method, Request};
use hyper_util::rt::TokioIo;
use serde::de::DeserializeOwned;
use shim_core::DiscoveryError;
use std::path::{Path, PathBuf};
use tokio::net::UnixStream;
use tracing::debug;

/// Default Docker Engine socket
pub const DEFAULT_DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// DockerClient issues one-shot HTTP/1 requests to the Docker Engine
#[derive(Clone, Debug)]
pub struct DockerClient {
    socket: PathBuf,
}

impl DockerClient {
    /// Create a client for the given engine socket
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
        }
    }

    /// Get the engine socket path
    pub fn socket(&self) -> &Path {
        &self.socket
    }

    /// GET `path` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DiscoveryError> {
        let stream = UnixStream::connect(&self.socket)
            .await
            .map_err(|e| runtime_error(format!("connect {}", self.socket.display()), e))?;

        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|e| runtime_error("handshake", e))?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!("Docker connection closed with error: {}", e);
            }
        });

        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .header(header::HOST, "docker")
            .body(Empty::<Bytes>::new())
            .map_err(|e| runtime_error("build request", e))?;

        let response = sender
            .send_request(request)
            .await
            .map_err(|e| runtime_error(format!("GET {}", path), e))?;
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| runtime_error("read body", e))?
            .to_bytes();

        if !status.is_success() {
            return Err(DiscoveryError::Runtime(format!(
                "GET {} returned {}: {}",
                path,
                status,
                String::from_utf8_lossy(&body).trim()
            )));
        }

        serde_json::from_slice(&body).map_err(|e| runtime_error("decode response", e))
    }
}

impl Default for DockerClient {
    fn default() -> Self {
        Self::new(DEFAULT_DOCKER_SOCKET)
    }
}

fn runtime_error(context: impl std::fmt::Display, err: impl std::fmt::Display) -> DiscoveryError {
    DiscoveryError::Runtime(format!("{}: {}", context, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::UnixListener;

    fn socket_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("shim-docker-{}-{}.sock", name, std::process::id()))
    }

    /// Serve one canned HTTP response on a fresh socket
    fn serve_once(path: &Path, status_line: &'static str, body: &'static str) {
        let _ = std::fs::remove_file(path);
        let listener = UnixListener::bind(path).unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = stream.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
        });
    }

    #[tokio::test]
    async fn test_get_json() {
        let path = socket_path("ok");
        serve_once(&path, "200 OK", r#"[{"Id":"abc"}]"#);

        let client = DockerClient::new(&path);
        let value: serde_json::Value = client.get_json("/containers/json").await.unwrap();
        assert_eq!(value[0]["Id"], "abc");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_get_json_error_status() {
        let path = socket_path("err");
        serve_once(&path, "500 Internal Server Error", r#"{"message":"boom"}"#);

        let client = DockerClient::new(&path);
        let result: Result<serde_json::Value, _> = client.get_json("/containers/json").await;
        match result {
            Err(DiscoveryError::Runtime(message)) => assert!(message.contains("500")),
            other => panic!("expected runtime error, got {:?}", other),
        }

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_missing_socket() {
        let client = DockerClient::new(socket_path("missing"));
        let result: Result<serde_json::Value, _> = client.get_json("/containers/json").await;
        assert!(matches!(result, Err(DiscoveryError::Runtime(_))));
    }

    #[test]
    fn test_default_socket() {
        assert_eq!(DockerClient::default().socket(), Path::new("/var/run/docker.sock"));
    }
}
