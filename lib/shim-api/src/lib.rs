//! Control-plane RPC contract for the envoy shim
//!
//! This library defines the `shimrpc.Registrar` service consumed by the shim:
//! - RegistrarRequest: one frontend/backend mapping plus the service identity
//! - RegistrarResponse: the status code returned by the control plane
//! - RegistrarClient: unary client stub for `Registrar/Register`
//!
//! The message types are hand-maintained prost derives so no protoc is
//! needed at build time. Field tags must stay in sync with `shimrpc.proto`.

pub mod registrar;
pub mod registrar_client;

pub use registrar::{registrar_request::Action, RegistrarRequest, RegistrarResponse};
pub use registrar_client::RegistrarClient;
