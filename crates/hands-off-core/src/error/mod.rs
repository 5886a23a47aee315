use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Engine supervision and update-check errors with source location tracking.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Engine binary could not be spawned.
    #[error("Failed to spawn engine: {source} {location}")]
    SpawnFailed {
        /// Underlying OS error from the spawn attempt.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Event listener could not bind its loopback endpoint.
    #[error("Failed to bind event listener: {source} {location}")]
    ListenerBind {
        /// Underlying OS error from the bind attempt.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Event listener ended before publishing its port.
    #[error("Event listener closed before handing off its port {location}")]
    ListenerUnavailable {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Update manifest could not be fetched.
    #[error("Update request failed: {source} {location}")]
    UpdateRequest {
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Update manifest could not be decoded.
    #[error("Update manifest decode failed: {source} {location}")]
    UpdateDecode {
        /// Underlying decode error.
        #[source]
        source: reqwest::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Update manifest has no entry for the running platform.
    #[error("Update manifest has no version for platform {platform:?} {location}")]
    ManifestMissingPlatform {
        /// Platform key that was looked up.
        platform: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for MonitorError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        MonitorError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`MonitorError`].
pub type Result<T> = std::result::Result<T, MonitorError>;
