/// User-facing events raised by the core components.
///
/// The core describes what happened; the notification copy the user reads
/// is decided by the binary crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// The engine reported hand-to-face contact.
    Touch {
        /// Face region that was touched, e.g. "nose" or "left eye".
        body_part: String,
    },
    /// The engine binary could not be started.
    BackendStartFailed,
    /// The running engine process could not be terminated.
    BackendStopFailed,
    /// The auto-restart budget ran out; monitoring is off.
    MonitoringStopped,
    /// A newer release is available for this platform.
    UpdateAvailable,
    /// The running version is the latest for this platform.
    UpToDate,
    /// The update manifest could not be fetched or decoded.
    UpdateCheckFailed,
    /// The default browser could not be opened.
    BrowserOpenFailed,
}
