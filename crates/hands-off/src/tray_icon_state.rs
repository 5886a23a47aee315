use hands_off_core::BackendState;

/// Tray icon states mirroring the engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayIconState {
    /// Monitoring is off.
    Offline,
    /// The engine is running.
    Online,
    /// The engine exited and a relaunch is pending.
    Restarting,
}

impl From<BackendState> for TrayIconState {
    fn from(state: BackendState) -> Self {
        match state {
            BackendState::Offline => TrayIconState::Offline,
            BackendState::Online => TrayIconState::Online,
            BackendState::Restarting => TrayIconState::Restarting,
        }
    }
}
