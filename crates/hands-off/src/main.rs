//! Hands Off: tray launcher supervising an external hand-to-face
//! detection engine.

mod app;
mod error;
mod menu_action;
mod notifier;
mod paths;
mod tray_command;
mod tray_icon_state;
mod tray_manager;

pub(crate) use {
    app::App,
    error::{AppError, Result as AppResult},
    menu_action::MenuAction,
    notifier::DesktopNotifier,
    paths::LauncherPaths,
    tray_command::TrayCommand,
    tray_icon_state::TrayIconState,
    tray_manager::{MenuIds, TrayManager},
};

use hands_off_core::{BackendConfig, BackendSupervisor, UpdateChecker};

use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::error;

/// Product site: help pages and downloads.
pub(crate) const PRODUCT_URL: &str = "https://handsoff.dev";
/// Release manifest endpoint for the update check.
pub(crate) const UPDATE_MANIFEST_URL: &str = "https://handsoff.dev/latest-version.json";

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("hands_off=debug,hands_off_core=debug")
        .init();

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => match cmd {
                TrayCommand::SetState(state) => {
                    if let Err(e) = tray_manager.update_state(state) {
                        error!(error = ?e, "Failed to update tray icon");
                    }
                }
                TrayCommand::Shutdown => {
                    *control_flow = ControlFlow::ExitWithCode(0);
                }
            },
            Event::NewEvents(tao::event::StartCause::Init) => {
                let paths = match LauncherPaths::resolve() {
                    Ok(p) => p,
                    Err(e) => {
                        error!("Failed to resolve launcher paths: {:?}", e);
                        std::process::exit(1);
                    }
                };

                let update_checker =
                    match UpdateChecker::new(UPDATE_MANIFEST_URL, env!("CARGO_PKG_VERSION")) {
                        Ok(c) => c,
                        Err(e) => {
                            error!("Failed to create update checker: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                let (alert_tx, alert_rx) = mpsc::channel(32);
                let (shutdown_tx, _) = watch::channel(false);

                let backend_config = BackendConfig::new(
                    paths.engine_binary,
                    paths.graph_config,
                    paths.engine_log,
                    paths.install_dir,
                );
                let supervisor = BackendSupervisor::new(backend_config, alert_tx.clone());

                let tray_proxy = tray_proxy.clone();
                let menu_ids = tray_manager.menu_ids();

                // Spawn tokio runtime on separate thread.
                // TrayManager stays on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let app = App {
                            supervisor,
                            update_checker,
                            notifier: DesktopNotifier::default(),
                            tray_proxy,
                            menu_ids,
                            alert_tx,
                            alert_rx,
                            shutdown_tx,
                        };

                        if let Err(e) = app.run().await {
                            error!(error = ?e, "Launcher failed");
                            std::process::exit(1);
                        }
                    });
                });
            }
            _ => {}
        }
    });
}
