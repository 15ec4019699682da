//! Command line flags
//!
//! Docker starts its userland proxy with Go-style single-dash flags
//! (`-host-ip 0.0.0.0 -host-port 8080 ...`), so those are rewritten to
//! double-dash form before clap sees them.

use anyhow::{bail, Result};
use clap::Parser;
use shim_core::config::DEFAULT_SERVER_ADDR;
use shim_core::{EndpointMapping, RegistrarConfig, RetrySchedule};
use shim_docker::client::DEFAULT_DOCKER_SOCKET;
use std::ffi::OsString;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "envoy-shim",
    version,
    about = "Registers container ports with the edge proxy control plane in place of docker-proxy"
)]
pub struct Cli {
    /// Protocol of the published port
    #[arg(long, default_value = "tcp")]
    pub proto: String,

    /// Host address traffic arrives on
    #[arg(long)]
    pub host_ip: IpAddr,

    /// Host port traffic arrives on
    #[arg(long)]
    pub host_port: u16,

    /// Container address traffic is routed to
    #[arg(long)]
    pub container_ip: IpAddr,

    /// Container port traffic is routed to
    #[arg(long)]
    pub container_port: u16,

    /// Control plane unix socket
    #[arg(long, env = "ENVOY_SHIM_SERVER_ADDR", default_value = DEFAULT_SERVER_ADDR)]
    pub server_addr: PathBuf,

    /// Docker Engine unix socket
    #[arg(long, env = "ENVOY_SHIM_DOCKER_SOCKET", default_value = DEFAULT_DOCKER_SOCKET)]
    pub docker_socket: PathBuf,

    /// Control plane dial timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub dial_timeout_ms: u64,

    /// Pause before registering, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub startup_delay_ms: u64,

    /// Delays between registration attempts, in milliseconds
    #[arg(long, value_delimiter = ',', default_value = "100,500,1000,1500")]
    pub retry_schedule: Vec<u64>,

    /// Register once and exit (re-sync an already running instance)
    #[arg(long)]
    pub reload: bool,

    /// Emit logs as JSON
    #[arg(long, env = "ENVOY_SHIM_LOG_JSON")]
    pub log_json: bool,
}

impl Cli {
    /// Parse process arguments, accepting single-dash long flags
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_flags(std::env::args_os()))
    }

    pub fn mapping(&self) -> Result<EndpointMapping> {
        if self.proto != "tcp" {
            bail!("unsupported protocol {:?}: only tcp ports can be registered", self.proto);
        }
        Ok(EndpointMapping::new(
            SocketAddr::new(self.host_ip, self.host_port),
            SocketAddr::new(self.container_ip, self.container_port),
        ))
    }

    pub fn registrar_config(&self) -> Result<RegistrarConfig> {
        Ok(RegistrarConfig {
            server_addr: self.server_addr.clone(),
            dial_timeout: Duration::from_millis(self.dial_timeout_ms),
            startup_delay: Duration::from_millis(self.startup_delay_ms),
            retry_schedule: RetrySchedule::from_millis(&self.retry_schedule)?,
            reload: self.reload,
        })
    }
}

/// Rewrite `-long-flag` to `--long-flag`, leaving the program name,
/// short flags, values and negative numbers alone
pub fn normalize_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 {
                return arg;
            }
            match arg.to_str() {
                Some(s) if is_single_dash_long(s) => OsString::from(format!("-{}", s)),
                _ => arg,
            }
        })
        .collect()
}

fn is_single_dash_long(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    rest.len() > 1 && rest.starts_with(|c: char| c.is_ascii_alphabetic())
}
