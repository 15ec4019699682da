//! Endpoint registration core for the envoy shim
//!
//! This library provides:
//! - Endpoint mappings and the service identity attached to them
//! - A fixed-schedule retry controller
//! - A reconnect-per-call registration client for the control plane
//! - The endpoint registrar that drives startup registration and shutdown
//!   deregistration

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod registrar;
pub mod resolver;
pub mod retry;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{ControlPlane, Dialer, RegistrationClient};
pub use config::RegistrarConfig;
pub use endpoint::{build_request, EndpointMapping, ServiceIdentity};
pub use error::{DiscoveryError, Result, ShimError};
pub use registrar::{EndpointRegistrar, RegistrarState};
pub use resolver::Resolver;
pub use retry::{with_retries, RetrySchedule};
pub use transport::{GrpcConnection, UnixSocketDialer};
