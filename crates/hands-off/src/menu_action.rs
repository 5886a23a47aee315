/// Actions the user can trigger from the tray menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Start engine monitoring.
    TurnOn,
    /// Stop engine monitoring.
    TurnOff,
    /// Open the help page in the default browser.
    OpenHelp,
    /// Run an update check and report the outcome.
    CheckForUpdates,
    /// Stop the engine and quit the launcher.
    Quit,
}
