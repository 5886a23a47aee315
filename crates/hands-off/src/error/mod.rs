use hands_off_core::MonitorError;

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the hands-off binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Supervision or update error from hands-off-core.
    #[error("Monitor error: {source} {location}")]
    Monitor {
        /// The underlying core error.
        #[source]
        source: MonitorError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Tray icon or menu operation failed.
    #[error("Tray error: {reason} {location}")]
    Tray {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Launcher path resolution failed.
    #[error("Path error: {reason} {location}")]
    Paths {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

// Manual From<MonitorError> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<MonitorError> for AppError {
    #[track_caller]
    fn from(source: MonitorError) -> Self {
        AppError::Monitor {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
