use std::time::Duration;

/// Lifecycle state of the supervised engine process.
///
/// `Restarting` covers the fixed pause between an unexpected exit and the
/// automatic relaunch; user start and stop requests are no-ops inside
/// that window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    /// No engine process is tracked.
    Offline,
    /// A launched engine process is believed to be running.
    Online,
    /// An unexpected exit was observed; a relaunch is pending.
    Restarting,
}

/// Auto-restart budget granted on every successful user start.
pub const RETRY_BUDGET_CEILING: u32 = 60;

/// Pause between an unexpected exit and the automatic relaunch.
pub(crate) const DEFAULT_RESTART_DELAY: Duration = Duration::from_secs(1);
