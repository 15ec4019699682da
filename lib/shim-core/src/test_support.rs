//! In-process doubles for the control plane and the resolver

use crate::client::{ControlPlane, Dialer};
use crate::{DiscoveryError, Resolver, Result, ServiceIdentity, ShimError};
use async_trait::async_trait;
use shim_api::{RegistrarRequest, RegistrarResponse};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// How the fake control plane behaves
#[derive(Clone, Debug)]
pub struct ControlPlaneScript {
    /// Number of initial dials that fail
    pub unreachable_dials: usize,
    /// Status codes returned per call; the last one repeats
    pub statuses: Vec<i32>,
}

impl Default for ControlPlaneScript {
    fn default() -> Self {
        Self {
            unreachable_dials: 0,
            statuses: vec![200],
        }
    }
}

impl ControlPlaneScript {
    pub fn unreachable_for(dials: usize) -> Self {
        Self {
            unreachable_dials: dials,
            ..Default::default()
        }
    }

    pub fn with_statuses(statuses: Vec<i32>) -> Self {
        Self {
            statuses,
            ..Default::default()
        }
    }
}

#[derive(Default)]
pub struct DialStats {
    dials: AtomicUsize,
    calls: AtomicUsize,
    closes: AtomicUsize,
    requests: Mutex<Vec<RegistrarRequest>>,
    dial_times: Mutex<Vec<Instant>>,
}

impl DialStats {
    pub fn dials(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RegistrarRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn dial_times(&self) -> Vec<Instant> {
        self.dial_times.lock().unwrap().clone()
    }
}

pub struct MockDialer {
    script: ControlPlaneScript,
    stats: Arc<DialStats>,
}

impl MockDialer {
    pub fn new(script: ControlPlaneScript) -> Self {
        Self {
            script,
            stats: Arc::new(DialStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<DialStats> {
        self.stats.clone()
    }
}

#[async_trait]
impl Dialer for MockDialer {
    type Conn = MockConnection;

    async fn dial(&self) -> Result<MockConnection> {
        let attempt = self.stats.dials.fetch_add(1, Ordering::SeqCst);
        self.stats.dial_times.lock().unwrap().push(Instant::now());
        if attempt < self.script.unreachable_dials {
            return Err(ShimError::Dial {
                target: self.target(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(MockConnection {
            stats: self.stats.clone(),
            statuses: self.script.statuses.clone(),
        })
    }

    fn target(&self) -> String {
        "unix:///tmp/mock-control-plane.sock".to_string()
    }
}

pub struct MockConnection {
    stats: Arc<DialStats>,
    statuses: Vec<i32>,
}

#[async_trait]
impl ControlPlane for MockConnection {
    async fn register(&mut self, request: RegistrarRequest) -> Result<RegistrarResponse> {
        let call = self.stats.calls.fetch_add(1, Ordering::SeqCst);
        self.stats.requests.lock().unwrap().push(request);
        let status_code = self
            .statuses
            .get(call)
            .or(self.statuses.last())
            .copied()
            .unwrap_or(200);
        Ok(RegistrarResponse { status_code })
    }

    fn close(self) {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MockResolver {
    identity: ServiceIdentity,
    missing_for: usize,
    lookups: AtomicUsize,
    settled: Mutex<Vec<Duration>>,
}

impl MockResolver {
    pub fn new(service: &str, environment: &str, mode: &str) -> Self {
        Self {
            identity: ServiceIdentity {
                service_name: service.to_string(),
                environment_name: environment.to_string(),
                proxy_mode: mode.to_string(),
            },
            missing_for: 0,
            lookups: AtomicUsize::new(0),
            settled: Mutex::new(Vec::new()),
        }
    }

    /// Fail the first `lookups` lookups with `NotFound`
    pub fn missing_for(mut self, lookups: usize) -> Self {
        self.missing_for = lookups;
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn settled(&self) -> Vec<Duration> {
        self.settled.lock().unwrap().clone()
    }
}

#[async_trait]
impl Resolver for MockResolver {
    async fn container_fields_for_port(
        &self,
        port: u16,
    ) -> std::result::Result<ServiceIdentity, DiscoveryError> {
        let lookup = self.lookups.fetch_add(1, Ordering::SeqCst);
        if lookup < self.missing_for {
            return Err(DiscoveryError::NotFound(port));
        }
        Ok(self.identity.clone())
    }

    async fn settle(&self, delay: Duration) {
        self.settled.lock().unwrap().push(delay);
        tokio::time::sleep(delay).await;
    }
}
