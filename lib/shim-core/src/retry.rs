//! Fixed-schedule retries
//!
//! The schedule is a literal list of delays, not a growth formula. Its
//! length is the attempt budget.

use crate::{Result, ShimError};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Ordered delays slept between attempts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrySchedule {
    delays: Vec<Duration>,
}

impl RetrySchedule {
    /// Create a schedule; at least one entry is required
    pub fn new(delays: Vec<Duration>) -> Result<Self> {
        if delays.is_empty() {
            return Err(ShimError::InvalidConfiguration(
                "retry schedule must contain at least one delay".to_string(),
            ));
        }
        Ok(Self { delays })
    }

    /// Create a schedule from millisecond delays
    pub fn from_millis(millis: &[u64]) -> Result<Self> {
        Self::new(millis.iter().copied().map(Duration::from_millis).collect())
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Number of attempts the schedule allows
    pub fn len(&self) -> usize {
        self.delays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self {
            delays: [100, 500, 1000, 1500]
                .into_iter()
                .map(Duration::from_millis)
                .collect(),
        }
    }
}

/// Run `operation` until it succeeds or the schedule is used up.
///
/// A failed attempt sleeps for the next delay before retrying. Returns the
/// error from the final attempt when every attempt fails.
pub async fn with_retries<T, E, F, Fut>(
    schedule: &RetrySchedule,
    mut operation: F,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Display,
{
    let budget = schedule.len();
    let mut attempt = 0;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        attempt += 1;
        if attempt >= budget {
            return Err(err);
        }
        let delay = schedule.delays()[attempt - 1];

        warn!(
            attempt,
            budget,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Retrying..."
        );
        tokio::time::sleep(delay).await;
    }
}
