//! Reconnect-per-call registration client
//!
//! Each call dials the control plane, issues one request and closes the
//! connection. Call volume is one request at startup and one at shutdown, so
//! no connection is kept between calls.

use crate::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use shim_api::{RegistrarRequest, RegistrarResponse};

/// A live connection to the control plane
#[async_trait]
pub trait ControlPlane: Send {
    /// Issue one `Register` call
    async fn register(&mut self, request: RegistrarRequest) -> Result<RegistrarResponse>;

    /// Tear down the connection
    fn close(self)
    where
        Self: Sized;
}

/// Opens connections to the control plane
#[async_trait]
pub trait Dialer: Send + Sync {
    type Conn: ControlPlane;

    /// Block until connected or the dial timeout elapses
    async fn dial(&self) -> Result<Self::Conn>;

    /// Human readable location of the control plane, for logs
    fn target(&self) -> String;
}

/// Registration client that never holds a connection between calls
pub struct RegistrationClient<D> {
    dialer: D,
}

impl<D: Dialer> RegistrationClient<D> {
    pub fn new(dialer: D) -> Self {
        Self { dialer }
    }

    pub fn dialer(&self) -> &D {
        &self.dialer
    }

    /// Dial, run `action` once on the live connection, then close it.
    ///
    /// The connection is closed whether or not `action` succeeds. A dial
    /// failure is returned as-is; retrying is left to the caller.
    pub async fn with_connection<T, F>(&self, action: F) -> Result<T>
    where
        F: for<'c> FnOnce(&'c mut D::Conn) -> BoxFuture<'c, Result<T>>,
    {
        let mut conn = self.dialer.dial().await?;
        let result = action(&mut conn).await;
        conn.close();
        result
    }
}
