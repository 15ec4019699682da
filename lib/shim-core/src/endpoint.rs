//! Endpoint mappings and request construction
use serde::{Deserialize, Serialize};
use shim_api::{Action, RegistrarRequest};
use std::fmt;
use std::net::SocketAddr;

/// Where external traffic arrives and where it should be routed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointMapping {
    frontend: SocketAddr,
    backend: SocketAddr,
}

impl EndpointMapping {
    pub fn new(frontend: SocketAddr, backend: SocketAddr) -> Self {
        Self { frontend, backend }
    }

    pub fn frontend(&self) -> SocketAddr {
        self.frontend
    }

    pub fn backend(&self) -> SocketAddr {
        self.backend
    }
}

impl fmt::Display for EndpointMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.frontend, self.backend)
    }
}

/// Service metadata attached to the container behind a mapping
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIdentity {
    pub service_name: String,
    pub environment_name: String,
    pub proxy_mode: String,
}

/// Build a control-plane request for one action on a mapping
pub fn build_request(
    mapping: &EndpointMapping,
    identity: &ServiceIdentity,
    action: Action,
) -> RegistrarRequest {
    RegistrarRequest {
        frontend_addr: mapping.frontend.ip().to_string(),
        frontend_port: i32::from(mapping.frontend.port()),
        backend_addr: mapping.backend.ip().to_string(),
        backend_port: i32::from(mapping.backend.port()),
        service_name: identity.service_name.clone(),
        environment_name: identity.environment_name.clone(),
        proxy_mode: identity.proxy_mode.clone(),
        action: action as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> ServiceIdentity {
        ServiceIdentity {
            service_name: "api".to_string(),
            environment_name: "prod".to_string(),
            proxy_mode: "http".to_string(),
        }
    }

    #[test]
    fn test_build_request_mirrors_inputs() {
        let mapping = EndpointMapping::new(
            "10.0.0.5:8080".parse().unwrap(),
            "172.17.0.2:80".parse().unwrap(),
        );
        let request = build_request(&mapping, &identity(), Action::Register);

        assert_eq!(request.frontend_addr, "10.0.0.5");
        assert_eq!(request.frontend_port, 8080);
        assert_eq!(request.backend_addr, "172.17.0.2");
        assert_eq!(request.backend_port, 80);
        assert_eq!(request.service_name, "api");
        assert_eq!(request.environment_name, "prod");
        assert_eq!(request.proxy_mode, "http");
        assert_eq!(request.action(), Action::Register);
    }

    #[test]
    fn test_build_request_sets_deregister() {
        let mapping = EndpointMapping::new(
            "[::1]:443".parse().unwrap(),
            "[fd00::2]:8443".parse().unwrap(),
        );
        let request = build_request(&mapping, &identity(), Action::Deregister);

        assert_eq!(request.frontend_addr, "::1");
        assert_eq!(request.backend_addr, "fd00::2");
        assert_eq!(request.backend_port, 8443);
        assert_eq!(request.action(), Action::Deregister);
    }

    #[test]
    fn test_mapping_display() {
        let mapping = EndpointMapping::new(
            "0.0.0.0:8080".parse().unwrap(),
            "172.17.0.2:80".parse().unwrap(),
        );
        assert_eq!(mapping.to_string(), "0.0.0.0:8080 -> 172.17.0.2:80");
    }
}
