//! `shimrpc` message types

/// Request to add or remove one endpoint mapping on the edge proxy
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegistrarRequest {
    #[prost(string, tag = "1")]
    pub frontend_addr: String,
    #[prost(int32, tag = "2")]
    pub frontend_port: i32,
    #[prost(string, tag = "3")]
    pub backend_addr: String,
    #[prost(int32, tag = "4")]
    pub backend_port: i32,
    #[prost(string, tag = "5")]
    pub service_name: String,
    #[prost(string, tag = "6")]
    pub environment_name: String,
    #[prost(string, tag = "7")]
    pub proxy_mode: String,
    #[prost(enumeration = "registrar_request::Action", tag = "8")]
    pub action: i32,
}

pub mod registrar_request {
    use serde::{Deserialize, Serialize};

    /// What the control plane should do with the mapping
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum Action {
        Register = 0,
        Deregister = 1,
    }

    impl Action {
        /// Name of the variant as written in the proto definition
        pub fn as_str_name(&self) -> &'static str {
            match self {
                Action::Register => "REGISTER",
                Action::Deregister => "DEREGISTER",
            }
        }
    }

    impl std::fmt::Display for Action {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.as_str_name())
        }
    }
}

/// Control plane answer to a RegistrarRequest
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegistrarResponse {
    #[prost(int32, tag = "1")]
    pub status_code: i32,
}

impl RegistrarResponse {
    /// Whether the status code reports success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
