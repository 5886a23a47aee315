//! Filesystem layout around the launcher executable.
//!
//! There is no persisted configuration: everything the launcher needs is
//! derived from where its own binary sits, plus a per-platform data
//! directory for the engine log.

use crate::{AppError, AppResult};

use std::{env, panic::Location, path::PathBuf};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use tracing::debug;

/// File name of the engine binary, expected next to the launcher.
pub(crate) const ENGINE_BINARY: &str = "handsoff-engine";
/// Vision graph definition handed to the engine, same directory.
pub(crate) const GRAPH_CONFIG_FILE: &str = "hand_face_tracking.pbtxt";
/// File receiving the engine's stdout and stderr.
pub(crate) const ENGINE_LOG_FILE: &str = "engine.log";

/// Resolved locations for one launcher run.
#[derive(Debug, Clone)]
pub struct LauncherPaths {
    /// Engine binary path.
    pub engine_binary: PathBuf,
    /// Graph definition path.
    pub graph_config: PathBuf,
    /// Engine log destination.
    pub engine_log: PathBuf,
    /// Directory containing the launcher executable.
    pub install_dir: PathBuf,
}

impl LauncherPaths {
    /// Derive all paths from the running executable's location.
    #[track_caller]
    pub fn resolve() -> AppResult<Self> {
        let exe = env::current_exe().map_err(|e| AppError::Paths {
            reason: format!("Failed to locate launcher executable: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let install_dir = exe
            .parent()
            .ok_or_else(|| AppError::Paths {
                reason: format!(
                    "Launcher executable has no parent directory: {}",
                    exe.display()
                ),
                location: ErrorLocation::from(Location::caller()),
            })?
            .to_path_buf();

        let engine_log = engine_log_path()?;

        debug!(
            install_dir = %install_dir.display(),
            engine_log = %engine_log.display(),
            "Launcher paths resolved"
        );

        Ok(Self {
            engine_binary: install_dir.join(ENGINE_BINARY),
            graph_config: install_dir.join(GRAPH_CONFIG_FILE),
            engine_log,
            install_dir,
        })
    }
}

/// Per-platform data directory for the engine log, created on demand.
#[track_caller]
fn engine_log_path() -> AppResult<PathBuf> {
    let proj_dirs = ProjectDirs::from("dev", "handsoff", "HandsOff").ok_or_else(|| {
        AppError::Paths {
            reason: "Failed to determine data directory".to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    let data_dir = proj_dirs.data_local_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(data_dir)?;
    }

    Ok(data_dir.join(ENGINE_LOG_FILE))
}
