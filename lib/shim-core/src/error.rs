use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShimError>;

/// Failures looking up a container's service identity
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("No container publishes port {0}")]
    NotFound(u16),

    #[error("Container {container} on port {port} is missing label {label}")]
    MetadataIncomplete {
        port: u16,
        container: String,
        label: &'static str,
    },

    #[error("Container runtime error: {0}")]
    Runtime(String),
}

#[derive(Error, Debug)]
pub enum ShimError {
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Unable to dial control plane at {target}: {reason}")]
    Dial { target: String, reason: String },

    #[error("RPC error: {0}")]
    Rpc(#[from] tonic::Status),

    #[error("Control plane returned status {status_code}")]
    Remote { status_code: i32 },

    #[error("Giving up after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: usize,
        #[source]
        source: Box<ShimError>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid registrar state: {0}")]
    InvalidState(String),
}
