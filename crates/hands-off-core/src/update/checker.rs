//! Release update check against the product's version manifest.

use crate::{
    Alert, CoreResult, MonitorError,
    update::version::update_available,
};

use std::{collections::HashMap, panic::Location, time::Duration};

use error_location::ErrorLocation;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// How often the background task re-checks the update endpoint.
pub const UPDATE_CHECK_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Per-request timeout. The periodic task must never wedge on a stalled
/// connection.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Request header carrying the best-effort machine identifier.
pub(crate) const HEADER_MACHINE_ID: &str = "x-machine-id";
/// Request header carrying the running launcher version.
pub(crate) const HEADER_APP_VERSION: &str = "x-app-version";
/// Request header carrying the host operating system name.
pub(crate) const HEADER_MACHINE_OS: &str = "x-machine-os";

/// Release manifest: platform name ("macos", "linux", "windows") mapped to
/// the latest published version string for that platform.
#[derive(Debug, Deserialize)]
struct VersionManifest {
    #[serde(flatten)]
    platforms: HashMap<String, String>,
}

/// Fetches the release manifest and compares it against the running
/// version.
///
/// `check_now` never claims an update unless the manifest decoded cleanly
/// and the entry for this platform compared strictly newer; callers treat
/// every error as "no update".
#[derive(Debug, Clone)]
pub struct UpdateChecker {
    client: Client,
    endpoint: String,
    current_version: String,
    machine_id: String,
    os: &'static str,
}

impl UpdateChecker {
    /// Create a checker against `endpoint` for the given running version.
    #[track_caller]
    pub fn new(endpoint: impl Into<String>, current_version: impl Into<String>) -> CoreResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MonitorError::UpdateRequest {
                source: e,
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            current_version: current_version.into(),
            machine_id: machine_identifier(),
            os: std::env::consts::OS,
        })
    }

    /// Fetch the manifest once and report whether a newer release exists
    /// for this platform.
    #[instrument(skip(self))]
    pub async fn check_now(&self) -> CoreResult<bool> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(HEADER_MACHINE_ID, &self.machine_id)
            .header(HEADER_APP_VERSION, &self.current_version)
            .header(HEADER_MACHINE_OS, self.os)
            .send()
            .await
            .map_err(|e| MonitorError::UpdateRequest {
                source: e,
                location: ErrorLocation::from(Location::caller()),
            })?
            .error_for_status()
            .map_err(|e| MonitorError::UpdateRequest {
                source: e,
                location: ErrorLocation::from(Location::caller()),
            })?;

        let manifest: VersionManifest =
            response
                .json()
                .await
                .map_err(|e| MonitorError::UpdateDecode {
                    source: e,
                    location: ErrorLocation::from(Location::caller()),
                })?;

        let latest = manifest.platforms.get(self.os).ok_or_else(|| {
            MonitorError::ManifestMissingPlatform {
                platform: self.os.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let newer = update_available(&self.current_version, latest);
        info!(
            current = %self.current_version,
            latest = %latest,
            update_available = newer,
            "Update check complete"
        );
        Ok(newer)
    }

    /// Run the recurring update check until shutdown is signalled.
    ///
    /// Checks once immediately, then on a fixed interval. Only a positive
    /// result surfaces as an alert; periodic failures are logged and
    /// otherwise silent.
    #[instrument(skip(self, alert_tx, shutdown_rx))]
    pub async fn run_periodic(
        self,
        alert_tx: mpsc::Sender<Alert>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(UPDATE_CHECK_INTERVAL);

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Update checker shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    match self.check_now().await {
                        Ok(true) => {
                            let _ = alert_tx.send(Alert::UpdateAvailable).await;
                        }
                        Ok(false) => debug!("No update available"),
                        Err(e) => warn!(error = ?e, "Periodic update check failed"),
                    }
                }
            }
        }
    }
}

/// Best-effort machine identifier attached to update requests.
///
/// The hostname is the closest stable identifier available without
/// persisting state; "NA" when the OS will not reveal one.
fn machine_identifier() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "NA".to_string())
}
