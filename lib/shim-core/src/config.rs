//! Registrar configuration

use crate::RetrySchedule;
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the control-plane socket
pub const DEFAULT_SERVER_ADDR: &str = "/var/run/envoy-shim.sock";

/// Registrar configuration
#[derive(Clone, Debug)]
pub struct RegistrarConfig {
    /// Unix socket the control plane listens on
    pub server_addr: PathBuf,
    /// How long a single dial may block
    pub dial_timeout: Duration,
    /// Pause before the first registration, skipped in reload mode
    pub startup_delay: Duration,
    /// Delays between registration attempts
    pub retry_schedule: RetrySchedule,
    /// Register once and exit instead of waiting for shutdown
    pub reload: bool,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            server_addr: PathBuf::from(DEFAULT_SERVER_ADDR),
            dial_timeout: Duration::from_secs(5),
            startup_delay: Duration::from_secs(1),
            retry_schedule: RetrySchedule::default(),
            reload: false,
        }
    }
}
