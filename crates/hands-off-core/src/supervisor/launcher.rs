//! Engine process invocation and termination.

use crate::{CoreResult, MonitorError, supervisor::state::DEFAULT_RESTART_DELAY};

use std::{panic::Location, path::PathBuf, process::Stdio, time::Duration};

use error_location::ErrorLocation;
use sysinfo::{Pid, ProcessesToUpdate, Signal, System};
use tokio::process::{Child, Command};
use tracing::debug;

/// Command-line flag carrying the vision graph path to the engine.
const GRAPH_CONFIG_FLAG: &str = "--graph-config";
/// Command-line flag carrying the event listener port to the engine.
const EVENT_PORT_FLAG: &str = "--event-port";

/// Everything needed to invoke the engine binary.
///
/// All paths are resolved by the caller up front; spawning only touches
/// the filesystem to open the log file.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Engine binary, expected next to the launcher executable.
    pub binary: PathBuf,
    /// Vision graph definition handed to the engine.
    pub graph_config: PathBuf,
    /// File receiving the engine's stdout and stderr, append mode.
    pub log_file: PathBuf,
    /// Working directory for the engine process.
    pub working_dir: PathBuf,
    /// Pause between an unexpected exit and the automatic relaunch.
    pub restart_delay: Duration,
}

impl BackendConfig {
    /// Config with the production restart delay.
    pub fn new(
        binary: PathBuf,
        graph_config: PathBuf,
        log_file: PathBuf,
        working_dir: PathBuf,
    ) -> Self {
        Self {
            binary,
            graph_config,
            log_file,
            working_dir,
            restart_delay: DEFAULT_RESTART_DELAY,
        }
    }
}

/// Spawn the engine bound to `port`, stdout and stderr appended to the
/// log file.
pub(crate) fn spawn_engine(config: &BackendConfig, port: u16) -> CoreResult<Child> {
    let log = std::fs::File::options()
        .create(true)
        .append(true)
        .open(&config.log_file)?;
    let log_err = log.try_clone()?;

    let child = Command::new(&config.binary)
        .arg(format!("{GRAPH_CONFIG_FLAG}={}", config.graph_config.display()))
        .arg(format!("{EVENT_PORT_FLAG}={port}"))
        .current_dir(&config.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_err))
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| MonitorError::SpawnFailed {
            source: e,
            location: ErrorLocation::from(Location::caller()),
        })?;

    debug!(pid = ?child.id(), binary = %config.binary.display(), "Engine spawned");
    Ok(child)
}

/// Terminate a process by pid.
///
/// Tries a graceful signal first and falls back to a force kill on
/// platforms without one. A pid that no longer exists counts as
/// terminated.
pub(crate) fn terminate_pid(pid: u32) -> bool {
    let target = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[target]), true);

    match system.process(target) {
        Some(process) => {
            if let Some(sent) = process.kill_with(Signal::Term) {
                debug!(pid, sent, "Sent term signal to engine");
                sent
            } else {
                let killed = process.kill();
                debug!(pid, killed, "Force-killed engine");
                killed
            }
        }
        None => {
            debug!(pid, "Engine process already gone");
            true
        }
    }
}
