//! Driven ports used by the dashboard loader.
//!
//! Fetching, forced recomputation, and the liveness ping are separate traits
//! so the ping can run on its own task with its own failure sink.

use async_trait::async_trait;
use tracing::warn;

use super::RequestError;
use crate::domain::{DashboardState, Username};

/// Source of dashboard configuration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardSource: Send + Sync {
    /// Fetch the current dashboard; `None` when the backend has none yet.
    async fn fetch_dashboard(&self, user: &Username)
    -> Result<Option<DashboardState>, RequestError>;

    /// Ask the backend to recompose the dashboard. Returns once it is done.
    async fn force_refresh(&self, user: &Username) -> Result<(), RequestError>;
}

/// Best-effort "session is active" signal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LivenessPing: Send + Sync {
    async fn ping(&self, user: &Username) -> Result<(), RequestError>;
}

/// Receives liveness-ping failures; these never reach the dashboard result.
#[cfg_attr(test, mockall::automock)]
pub trait PingFailureSink: Send + Sync {
    fn record(&self, user: &Username, error: &RequestError);
}

/// Sink that logs ping failures at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPingSink;

impl PingFailureSink for TracingPingSink {
    fn record(&self, user: &Username, error: &RequestError) {
        warn!(user = %user, error = %error, "liveness ping failed");
    }
}

/// Backend reachability check.
#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    /// Return whether the backend answered a health request.
    async fn is_reachable(&self) -> bool;
}
