//! Endpoint registrar
//!
//! Registers one frontend/backend mapping with the control plane at startup,
//! parks until shutdown, then deregisters it.
//!
//! ```text
//! Starting → Running → Stopping → Terminated
//! Starting → Terminated            (reload mode, or registration failed)
//! ```

use crate::client::{ControlPlane, Dialer, RegistrationClient};
use crate::{
    build_request, with_retries, EndpointMapping, RegistrarConfig, Resolver, Result, ShimError,
};
use shim_api::Action;
use std::fmt;
use std::future::Future;
use tracing::{debug, error, info};

/// Lifecycle of a registrar; transitions only move forward
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrarState {
    Starting,
    Running,
    Stopping,
    Terminated,
}

impl fmt::Display for RegistrarState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegistrarState::Starting => "starting",
            RegistrarState::Running => "running",
            RegistrarState::Stopping => "stopping",
            RegistrarState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Drives registration and deregistration of one endpoint mapping
pub struct EndpointRegistrar<R, D> {
    mapping: EndpointMapping,
    config: RegistrarConfig,
    resolver: R,
    client: RegistrationClient<D>,
    state: RegistrarState,
}

impl<R: Resolver, D: Dialer> EndpointRegistrar<R, D> {
    pub fn new(
        mapping: EndpointMapping,
        config: RegistrarConfig,
        resolver: R,
        client: RegistrationClient<D>,
    ) -> Self {
        Self {
            mapping,
            config,
            resolver,
            client,
            state: RegistrarState::Starting,
        }
    }

    pub fn state(&self) -> RegistrarState {
        self.state
    }

    pub fn mapping(&self) -> &EndpointMapping {
        &self.mapping
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Register, wait for `shutdown`, then deregister.
    ///
    /// In reload mode this returns right after registering and `shutdown`
    /// is never polled. Install signal handlers before calling so a signal
    /// that arrives during registration is not lost.
    pub async fn run<S>(&mut self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        self.start().await?;
        if self.state == RegistrarState::Terminated {
            return Ok(());
        }

        info!(mapping = %self.mapping, "Registered, waiting for shutdown signal");
        shutdown.await;
        self.close().await
    }

    /// Register the mapping with the control plane.
    ///
    /// Moves to `Running`, or straight to `Terminated` in reload mode. When
    /// every attempt fails the registrar is `Terminated` and the caller must
    /// treat the returned `RetryExhausted` as fatal.
    pub async fn start(&mut self) -> Result<()> {
        self.expect_state(RegistrarState::Starting, "start")?;
        info!(
            frontend = %self.mapping.frontend(),
            backend = %self.mapping.backend(),
            reload = self.config.reload,
            "Starting up"
        );

        // Container metadata lags creation slightly
        if !self.config.reload {
            self.resolver.settle(self.config.startup_delay).await;
        }

        match self.perform(Action::Register).await {
            Ok(()) => {
                self.state = if self.config.reload {
                    RegistrarState::Terminated
                } else {
                    RegistrarState::Running
                };
                debug!(state = %self.state, "Registration complete");
                Ok(())
            }
            Err(err) => {
                self.state = RegistrarState::Terminated;
                error!(
                    error = %err,
                    mapping = %self.mapping,
                    "Could not register with control plane"
                );
                Err(err)
            }
        }
    }

    /// Deregister the mapping. Only valid while `Running`.
    ///
    /// The registrar ends `Terminated` even when deregistration fails.
    pub async fn close(&mut self) -> Result<()> {
        self.expect_state(RegistrarState::Running, "close")?;
        info!(mapping = %self.mapping, "Shutting down!");
        self.state = RegistrarState::Stopping;

        let result = self.perform(Action::Deregister).await;
        self.state = RegistrarState::Terminated;

        if let Err(err) = &result {
            error!(
                error = %err,
                mapping = %self.mapping,
                "Could not deregister from control plane"
            );
        }
        result
    }

    fn expect_state(&self, expected: RegistrarState, operation: &str) -> Result<()> {
        if self.state != expected {
            return Err(ShimError::InvalidState(format!(
                "cannot {} while {}",
                operation, self.state
            )));
        }
        Ok(())
    }

    async fn perform(&self, action: Action) -> Result<()> {
        let schedule = &self.config.retry_schedule;
        with_retries(schedule, move || self.do_action(action))
            .await
            .map_err(|err| ShimError::RetryExhausted {
                attempts: schedule.len(),
                source: Box::new(err),
            })
    }

    /// One attempt: resolve the identity afresh, then send one request
    async fn do_action(&self, action: Action) -> Result<()> {
        let identity = self
            .resolver
            .container_fields_for_port(self.mapping.frontend().port())
            .await?;
        let request = build_request(&self.mapping, &identity, action);
        debug!(?request, "Calling control plane");

        let response = self
            .client
            .with_connection(move |plane| Box::pin(async move { plane.register(request).await }))
            .await?;
        info!(status = response.status_code, %action, "Status");

        if !response.is_success() {
            return Err(ShimError::Remote {
                status_code: response.status_code,
            });
        }
        Ok(())
    }
}
