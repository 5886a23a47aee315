//! Hands-Off Core Library
//!
//! Supervision of the external vision engine, its loopback touch-event
//! stream, and the release update check.
//!
//! # Example
//!
//! ```no_run
//! use hands_off_core::{BackendConfig, BackendSupervisor};
//!
//! use std::path::PathBuf;
//!
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (alert_tx, mut alert_rx) = mpsc::channel(32);
//!     let config = BackendConfig::new(
//!         PathBuf::from("handsoff-engine"),
//!         PathBuf::from("hand_face_tracking.pbtxt"),
//!         PathBuf::from("engine.log"),
//!         PathBuf::from("."),
//!     );
//!     let supervisor = BackendSupervisor::new(config, alert_tx);
//!
//!     supervisor.start(4221).await;
//!     if let Some(alert) = alert_rx.recv().await {
//!         println!("alert: {alert:?}");
//!     }
//!     supervisor.stop().await;
//! }
//! ```

mod alert;
mod error;
mod listener;
mod supervisor;
mod update;

pub use {
    alert::Alert,
    error::{MonitorError, Result as CoreResult},
    listener::{EventListener, TouchEvent},
    supervisor::{BackendConfig, BackendState, BackendSupervisor, RETRY_BUDGET_CEILING},
    update::{UPDATE_CHECK_INTERVAL, UpdateChecker, VersionTriple, update_available},
};

#[cfg(test)]
mod tests;
