use crate::TrayIconState;

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` is `!Send`),
/// so engine state mirroring and launcher shutdown flow through this enum.
#[derive(Debug, Clone, Copy)]
pub enum TrayCommand {
    /// Mirror an engine lifecycle state onto the tray indicator.
    SetState(TrayIconState),
    /// Exit the tao event loop; the launcher process ends with it.
    Shutdown,
}
