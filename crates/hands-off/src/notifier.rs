//! Desktop notification rendering.
//!
//! Alerts arrive as semantic events from the core crate; the copy the
//! user reads is decided here. Delivery is best-effort: a notification
//! that fails to show is logged and dropped, never escalated.

use crate::PRODUCT_URL;

use hands_off_core::Alert;
use notify_rust::Notification;
use tracing::{debug, warn};

/// Notification source name shown by the OS.
const APP_DISPLAY_NAME: &str = "Hands Off";

/// Renders core alerts as desktop notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    /// Show `alert` to the user, best-effort.
    pub fn show(&self, alert: &Alert) {
        let (summary, body) = render(alert);
        debug!(summary = %summary, "Showing notification");

        if let Err(e) = Notification::new()
            .appname(APP_DISPLAY_NAME)
            .summary(&summary)
            .body(&body)
            .show()
        {
            warn!(error = ?e, "Failed to deliver notification");
        }
    }
}

/// Map an alert to user-facing copy: (summary, body).
pub(crate) fn render(alert: &Alert) -> (String, String) {
    match alert {
        Alert::Touch { body_part } => (
            format!("You touched your {body_part}!"),
            "Keep your hands away from your face.".to_string(),
        ),
        Alert::BackendStartFailed => (
            "Failed to start camera monitoring".to_string(),
            format!("Please restart {APP_DISPLAY_NAME}."),
        ),
        Alert::BackendStopFailed => (
            "Failed to stop camera monitoring".to_string(),
            format!("Please quit {APP_DISPLAY_NAME} and end the engine process manually."),
        ),
        Alert::MonitoringStopped => (
            "Camera monitoring stopped".to_string(),
            "Start it again from the tray menu.".to_string(),
        ),
        Alert::UpdateAvailable => (
            format!("A new version of {APP_DISPLAY_NAME} is available"),
            format!("Download the latest version at {PRODUCT_URL}"),
        ),
        Alert::UpToDate => (
            "No updates available".to_string(),
            format!("You are using the latest version of {APP_DISPLAY_NAME}."),
        ),
        Alert::UpdateCheckFailed => (
            "Update check failed".to_string(),
            format!("Please check for the latest version at {PRODUCT_URL}"),
        ),
        Alert::BrowserOpenFailed => (
            "Failed to open the browser".to_string(),
            format!("For help, please visit {PRODUCT_URL}"),
        ),
    }
}
