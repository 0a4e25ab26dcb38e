//! Dashboard loader state machine.
//!
//! One loader serves one presentation session. It fetches the dashboard on
//! mount, on visibility events and after a forced recomposition, gates
//! rendering on the backend's readiness signal, and publishes its status
//! through a `watch` channel.
//!
//! At most one fetch per user and session is in flight; triggers arriving
//! meanwhile are coalesced and return [`TriggerOutcome::Coalesced`] without
//! touching the network. A fetch left over from a superseded session never
//! absorbs triggers for the current one, even when the same user is mounted
//! again. The in-flight mark lives in an RAII guard so it is cleared when the
//! fetch settles, fails or its future is dropped.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::ports::{DashboardSource, LivenessPing, PingFailureSink, RequestError};
use crate::domain::{DashboardState, Username};

/// Observable loader status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoaderStatus {
    /// No user mounted.
    #[default]
    Idle,
    /// First fetch for the mounted user.
    Loading,
    /// Re-fetch after a visibility event or a forced recomposition.
    Refreshing,
    /// Flagged ready with at least one tile.
    Ready(DashboardState),
    /// The backend is still composing; a waiting state, not an error.
    NotReady,
    /// The last fetch or recomposition failed.
    Failed(RequestError),
}

impl LoaderStatus {
    /// Whether a fetch is under way.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Loading | Self::Refreshing)
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Refreshing => "refreshing",
            Self::Ready(_) => "ready",
            Self::NotReady => "not_ready",
            Self::Failed(_) => "failed",
        }
    }
}

/// What became of one trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The fetch ran and the loader now holds this status.
    Settled(LoaderStatus),
    /// A fetch for the same user was already in flight; nothing was sent.
    Coalesced,
    /// No user is mounted.
    NoUser,
    /// The session changed while the fetch ran; its result was discarded.
    Superseded,
}

/// Driven ports used by [`DashboardLoader`].
#[derive(Clone)]
pub struct DashboardLoaderPorts {
    /// Fetches and recomposes dashboards.
    pub source: Arc<dyn DashboardSource>,
    /// Fire-and-forget liveness signal sent with every fetch.
    pub liveness: Arc<dyn LivenessPing>,
    /// Receives liveness failures, which never fail the fetch.
    pub ping_failures: Arc<dyn PingFailureSink>,
}

impl DashboardLoaderPorts {
    /// Bundle the loader's driven ports.
    pub fn new(
        source: Arc<dyn DashboardSource>,
        liveness: Arc<dyn LivenessPing>,
        ping_failures: Arc<dyn PingFailureSink>,
    ) -> Self {
        Self {
            source,
            liveness,
            ping_failures,
        }
    }
}

#[derive(Debug, Default)]
struct Session {
    user: Option<Username>,
    generation: u64,
    /// Running fetches keyed by user and the session generation they began in.
    in_flight: HashSet<(Username, u64)>,
}

/// Clears the in-flight mark for its user and generation when dropped.
struct InFlight<'a> {
    session: &'a Mutex<Session>,
    user: Username,
    generation: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.session)
            .in_flight
            .remove(&(self.user.clone(), self.generation));
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Loader for one presentation session.
pub struct DashboardLoader {
    ports: DashboardLoaderPorts,
    session: Mutex<Session>,
    status: watch::Sender<LoaderStatus>,
}

impl DashboardLoader {
    /// Build an idle loader over `ports`.
    pub fn new(ports: DashboardLoaderPorts) -> Self {
        let (status, _) = watch::channel(LoaderStatus::Idle);
        Self {
            ports,
            session: Mutex::new(Session::default()),
            status,
        }
    }

    /// Snapshot of the current status.
    pub fn status(&self) -> LoaderStatus {
        self.status.borrow().clone()
    }

    /// Receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<LoaderStatus> {
        self.status.subscribe()
    }

    /// The mounted user, if any.
    pub fn current_user(&self) -> Option<Username> {
        lock(&self.session).user.clone()
    }

    /// Mount `user` and load their dashboard.
    ///
    /// Mounting a different user supersedes any fetch still running for the
    /// previous one and reports [`LoaderStatus::Loading`]. Mounting the user
    /// who is already mounted behaves like a refresh.
    pub async fn mount(&self, user: Username) -> TriggerOutcome {
        let guard = {
            let mut session = lock(&self.session);
            let busy = if session.user.as_ref() == Some(&user) {
                LoaderStatus::Refreshing
            } else {
                session.user = Some(user);
                session.generation += 1;
                LoaderStatus::Loading
            };
            match self.begin(&mut session, busy) {
                Ok(guard) => guard,
                Err(outcome) => return outcome,
            }
        };
        self.fetch(guard).await
    }

    /// Re-fetch after the view became visible or regained focus.
    pub async fn on_visible(&self) -> TriggerOutcome {
        let guard = {
            let mut session = lock(&self.session);
            match self.begin(&mut session, LoaderStatus::Refreshing) {
                Ok(guard) => guard,
                Err(outcome) => return outcome,
            }
        };
        self.fetch(guard).await
    }

    /// Ask the backend to recompose the dashboard, then re-fetch it.
    ///
    /// A no-op while a fetch for the mounted user is already running.
    pub async fn force_refresh(&self) -> TriggerOutcome {
        let guard = {
            let mut session = lock(&self.session);
            match self.begin(&mut session, LoaderStatus::Refreshing) {
                Ok(guard) => guard,
                Err(outcome) => return outcome,
            }
        };
        if let Err(error) = self.ports.source.force_refresh(&guard.user).await {
            return self.settle(&guard, LoaderStatus::Failed(error));
        }
        self.fetch(guard).await
    }

    /// Unmount the user and return to [`LoaderStatus::Idle`].
    pub fn reset(&self) {
        let mut session = lock(&self.session);
        session.user = None;
        session.generation += 1;
        drop(session);
        self.publish(LoaderStatus::Idle);
    }

    fn begin<'a>(
        &'a self,
        session: &mut Session,
        busy: LoaderStatus,
    ) -> Result<InFlight<'a>, TriggerOutcome> {
        let Some(user) = session.user.clone() else {
            return Err(TriggerOutcome::NoUser);
        };
        if !session.in_flight.insert((user.clone(), session.generation)) {
            debug!(user = %user, "dashboard fetch already in flight; trigger coalesced");
            return Err(TriggerOutcome::Coalesced);
        }
        let guard = InFlight {
            session: &self.session,
            user,
            generation: session.generation,
        };
        self.publish(busy);
        Ok(guard)
    }

    async fn fetch(&self, guard: InFlight<'_>) -> TriggerOutcome {
        self.spawn_ping(guard.user.clone());
        let status = match self.ports.source.fetch_dashboard(&guard.user).await {
            Ok(Some(state)) if state.is_renderable() => LoaderStatus::Ready(state),
            Ok(_) => LoaderStatus::NotReady,
            Err(error) => LoaderStatus::Failed(error),
        };
        self.settle(&guard, status)
    }

    fn settle(&self, guard: &InFlight<'_>, status: LoaderStatus) -> TriggerOutcome {
        let session = lock(&self.session);
        let current =
            session.generation == guard.generation && session.user.as_ref() == Some(&guard.user);
        drop(session);
        if !current {
            debug!(user = %guard.user, "discarding dashboard result for superseded session");
            return TriggerOutcome::Superseded;
        }
        self.publish(status.clone());
        TriggerOutcome::Settled(status)
    }

    fn publish(&self, status: LoaderStatus) {
        info!(status = status.label(), "dashboard loader transition");
        self.status.send_replace(status);
    }

    fn spawn_ping(&self, user: Username) {
        let liveness = Arc::clone(&self.ports.liveness);
        let sink = Arc::clone(&self.ports.ping_failures);
        tokio::spawn(async move {
            if let Err(error) = liveness.ping(&user).await {
                sink.record(&user, &error);
            }
        });
    }
}

#[cfg(test)]
#[path = "dashboard_loader_tests.rs"]
mod tests;
