//! Engine lifecycle supervision.
//!
//! One lock guards the whole state machine: the lifecycle state, the
//! restart budget, and the identity of the current launch. Transitions are
//! driven by four events: user start, user stop, child exit, and liveness
//! evidence from the event stream. Each launch gets one watcher task that
//! waits on child exit and reports back; reports for a launch that is no
//! longer tracked are discarded by id.

use crate::{
    Alert, CoreResult,
    supervisor::{
        launcher::{BackendConfig, spawn_engine, terminate_pid},
        state::{BackendState, RETRY_BUDGET_CEILING},
    },
};

use std::{process::ExitStatus, sync::Arc};

use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Identity of one engine launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CurrentLaunch {
    id: Uuid,
    pid: u32,
}

/// Mutable supervisor state, every field behind the one lock.
#[derive(Debug)]
struct Inner {
    state: BackendState,
    retry_budget: u32,
    current: Option<CurrentLaunch>,
    port: u16,
}

/// Supervises the engine process: user start and stop, bounded automatic
/// relaunch on unexpected exit, and a watch channel publishing every state
/// transition for the tray indicator.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct BackendSupervisor {
    config: Arc<BackendConfig>,
    inner: Arc<Mutex<Inner>>,
    alert_tx: mpsc::Sender<Alert>,
    state_tx: watch::Sender<BackendState>,
}

impl BackendSupervisor {
    /// Create an offline supervisor for the given engine invocation.
    pub fn new(config: BackendConfig, alert_tx: mpsc::Sender<Alert>) -> Self {
        let (state_tx, _) = watch::channel(BackendState::Offline);

        Self {
            config: Arc::new(config),
            inner: Arc::new(Mutex::new(Inner {
                state: BackendState::Offline,
                retry_budget: 0,
                current: None,
                port: 0,
            })),
            alert_tx,
            state_tx,
        }
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<BackendState> {
        self.state_tx.subscribe()
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> BackendState {
        self.inner.lock().await.state
    }

    /// Remaining automatic-relaunch budget.
    pub async fn retry_budget(&self) -> u32 {
        self.inner.lock().await.retry_budget
    }

    /// Pid of the tracked launch, if any.
    pub async fn current_pid(&self) -> Option<u32> {
        self.inner.lock().await.current.map(|launch| launch.pid)
    }

    /// Launch the engine bound to the event listener's `port`.
    ///
    /// No-op unless offline. Success grants a fresh relaunch budget; a
    /// spawn failure is reported to the user and leaves the supervisor
    /// offline.
    #[instrument(skip(self))]
    pub async fn start(&self, port: u16) {
        let mut alert = None;
        {
            let mut inner = self.inner.lock().await;
            if inner.state != BackendState::Offline {
                debug!(state = ?inner.state, "Start ignored");
                return;
            }

            inner.port = port;
            match self.launch_locked(&mut inner) {
                Ok(()) => {
                    inner.retry_budget = RETRY_BUDGET_CEILING;
                    info!(port, "Engine monitoring started");
                }
                Err(e) => {
                    error!(error = ?e, "Failed to start engine");
                    alert = Some(Alert::BackendStartFailed);
                }
            }
        }

        if let Some(alert) = alert {
            let _ = self.alert_tx.send(alert).await;
        }
    }

    /// Terminate the tracked engine process.
    ///
    /// No-op unless online. A kill failure is reported to the user and
    /// leaves the state unchanged; the process may still be running.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        let mut alert = None;
        {
            let mut inner = self.inner.lock().await;
            if inner.state != BackendState::Online {
                debug!(state = ?inner.state, "Stop ignored");
                return;
            }

            let Some(current) = inner.current else {
                // Online without a launch cannot happen; resynchronize.
                warn!("Online with no tracked launch, forcing offline");
                self.set_state_locked(&mut inner, BackendState::Offline);
                return;
            };

            if terminate_pid(current.pid) {
                inner.current = None;
                self.set_state_locked(&mut inner, BackendState::Offline);
                info!(pid = current.pid, "Engine monitoring stopped");
            } else {
                warn!(pid = current.pid, "Failed to terminate engine");
                alert = Some(Alert::BackendStopFailed);
            }
        }

        if let Some(alert) = alert {
            let _ = self.alert_tx.send(alert).await;
        }
    }

    /// Liveness evidence from the event stream.
    ///
    /// While online this clears the relaunch budget: once real traffic has
    /// been seen, a later crash surfaces to the user immediately instead
    /// of cycling through silent relaunches. Only a user start replenishes
    /// the budget.
    pub async fn on_liveness_signal(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == BackendState::Online && inner.retry_budget > 0 {
            debug!(previous_budget = inner.retry_budget, "Engine confirmed live");
            inner.retry_budget = 0;
        }
    }

    /// Watcher callback: the child of `launch_id` exited.
    ///
    /// A tracked launch exiting is by definition unexpected, because user
    /// stops untrack the launch before the watcher can report. With budget
    /// left the engine is relaunched after a pause; otherwise monitoring
    /// goes offline and the user is told.
    #[instrument(skip(self))]
    async fn on_child_exit(&self, launch_id: Uuid, status: Option<ExitStatus>) {
        let mut alert = None;
        let mut relaunch_after = None;
        {
            let mut inner = self.inner.lock().await;
            if !inner.current.is_some_and(|launch| launch.id == launch_id) {
                debug!(%launch_id, "Ignoring exit of an untracked launch");
                return;
            }

            inner.current = None;
            warn!(%launch_id, status = ?status, "Engine exited unexpectedly");

            if inner.retry_budget > 0 {
                inner.retry_budget -= 1;
                self.set_state_locked(&mut inner, BackendState::Restarting);
                relaunch_after = Some(self.config.restart_delay);
            } else {
                self.set_state_locked(&mut inner, BackendState::Offline);
                alert = Some(Alert::MonitoringStopped);
            }
        }

        if let Some(alert) = alert {
            let _ = self.alert_tx.send(alert).await;
            return;
        }

        if let Some(delay) = relaunch_after {
            tokio::time::sleep(delay).await;
            self.relaunch().await;
        }
    }

    /// One automatic relaunch attempt after the restart pause.
    async fn relaunch(&self) {
        let mut alert = None;
        {
            let mut inner = self.inner.lock().await;
            if inner.state != BackendState::Restarting {
                debug!(state = ?inner.state, "Relaunch abandoned");
                return;
            }

            match self.launch_locked(&mut inner) {
                Ok(()) => info!(budget = inner.retry_budget, "Engine relaunched"),
                Err(e) => {
                    error!(error = ?e, "Relaunch failed");
                    self.set_state_locked(&mut inner, BackendState::Offline);
                    alert = Some(Alert::BackendStartFailed);
                }
            }
        }

        if let Some(alert) = alert {
            let _ = self.alert_tx.send(alert).await;
        }
    }

    /// Spawn the engine and attach a watcher task to the new launch.
    ///
    /// Caller holds the lock. On success the supervisor is online and the
    /// new launch is the tracked one.
    fn launch_locked(&self, inner: &mut Inner) -> CoreResult<()> {
        let mut child = spawn_engine(&self.config, inner.port)?;
        let pid = child.id().unwrap_or(0);
        let launch_id = Uuid::new_v4();

        inner.current = Some(CurrentLaunch { id: launch_id, pid });
        self.set_state_locked(inner, BackendState::Online);

        let supervisor = self.clone();
        tokio::spawn(async move {
            let status = match child.wait().await {
                Ok(status) => Some(status),
                Err(e) => {
                    warn!(error = ?e, "Failed waiting on engine process");
                    None
                }
            };
            supervisor.on_child_exit(launch_id, status).await;
        });

        debug!(%launch_id, pid, "Watcher attached to engine launch");
        Ok(())
    }

    /// Record a state transition and publish it to subscribers.
    fn set_state_locked(&self, inner: &mut Inner, state: BackendState) {
        if inner.state != state {
            debug!(from = ?inner.state, to = ?state, "Backend state transition");
        }
        inner.state = state;
        let _ = self.state_tx.send_replace(state);
    }
}
