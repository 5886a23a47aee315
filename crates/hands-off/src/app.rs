use crate::{
    AppResult, DesktopNotifier, MenuAction, MenuIds, PRODUCT_URL, TrayCommand, TrayIconState,
};

use hands_off_core::{
    Alert, BackendState, BackendSupervisor, EventListener, MonitorError, UpdateChecker,
};

use std::panic::Location;

use error_location::ErrorLocation;
use tao::event_loop::EventLoopProxy;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{error, info, instrument, warn};
use tray_icon::menu::MenuEvent;

/// Main application controller.
///
/// Runs on the async runtime thread and owns the top-level select loop:
/// tray menu actions, alerts from the core components, and supervisor
/// state transitions, handled one at a time in arrival order. Tray
/// mutations go back to the main thread through the event-loop proxy
/// because `TrayIcon` is `!Send` and must stay on the UI thread.
pub struct App {
    pub(crate) supervisor: BackendSupervisor,
    pub(crate) update_checker: UpdateChecker,
    pub(crate) notifier: DesktopNotifier,
    pub(crate) tray_proxy: EventLoopProxy<TrayCommand>,
    pub(crate) menu_ids: MenuIds,
    pub(crate) alert_tx: mpsc::Sender<Alert>,
    pub(crate) alert_rx: mpsc::Receiver<Alert>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl App {
    /// Run the controller until the user quits.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Hands Off starting");

        // The listener comes up first: the engine cannot be launched
        // until the OS has assigned the event port.
        let (port_tx, port_rx) = oneshot::channel();
        let listener = EventListener::new(self.supervisor.clone(), self.alert_tx.clone());
        let listener_shutdown = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            if let Err(e) = listener.run(port_tx, listener_shutdown).await {
                error!(error = ?e, "Event listener failed");
            }
        });

        // A dropped sender means the bind failed; without the event port
        // there is nothing to supervise, so this is the one fatal path.
        let Ok(port) = port_rx.await else {
            error!("Event listener never published a port, aborting");
            return Err(MonitorError::ListenerUnavailable {
                location: ErrorLocation::from(Location::caller()),
            }
            .into());
        };

        // Monitoring starts with the launcher; the menu can turn it off.
        self.supervisor.start(port).await;

        let checker = self.update_checker.clone();
        let checker_alerts = self.alert_tx.clone();
        let checker_shutdown = self.shutdown_tx.subscribe();
        tokio::spawn(checker.run_periodic(checker_alerts, checker_shutdown));

        // Tray event forwarding via single persistent blocking task.
        //
        // MenuEvent::receiver() returns a crossbeam_channel::Receiver which
        // HAS blocking recv() -- zero polling, instant response, one thread.
        //
        // Shutdown: when menu_event_rx is dropped (main loop breaks),
        // menu_event_tx.blocking_send() fails, breaking the blocking loop.
        let (menu_event_tx, mut menu_event_rx) = mpsc::channel(32);
        let menu_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if menu_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        // The auto-start above ran before this subscription, and a fresh
        // watch receiver counts the current value as already seen. Mirror
        // it once so the tray does not sit on the boot icon while the
        // engine is running.
        let mut state_rx = self.supervisor.subscribe();
        self.update_tray(*state_rx.borrow_and_update());

        loop {
            tokio::select! {
                Some(event) = menu_event_rx.recv() => {
                    match self.menu_ids.action(&event.id) {
                        Some(MenuAction::Quit) => {
                            info!("Quit requested from tray menu");
                            break;
                        }
                        Some(action) => self.handle_menu_action(action, port).await,
                        None => {}
                    }
                }

                Some(alert) = self.alert_rx.recv() => {
                    self.notifier.show(&alert);
                }

                Ok(()) = state_rx.changed() => {
                    let state = *state_rx.borrow_and_update();
                    self.update_tray(state);
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        info!("Shutting down");

        // The engine dies with the launcher. A kill failure still reaches
        // the user through the alert drain below.
        self.supervisor.stop().await;
        let _ = self.shutdown_tx.send(true);

        while let Ok(alert) = self.alert_rx.try_recv() {
            self.notifier.show(&alert);
        }

        drop(menu_event_rx);

        match tokio::time::timeout(std::time::Duration::from_secs(1), menu_handle).await {
            Ok(Ok(())) => info!("Menu event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Menu event forwarder task panicked"),
            Err(_) => info!(
                "Menu event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        let _ = self.tray_proxy.send_event(TrayCommand::Shutdown);
        info!("Hands Off shut down successfully");

        Ok(())
    }

    /// Dispatch one tray menu action.
    #[instrument(skip(self))]
    async fn handle_menu_action(&mut self, action: MenuAction, port: u16) {
        match action {
            MenuAction::TurnOn => self.supervisor.start(port).await,
            MenuAction::TurnOff => self.supervisor.stop().await,
            MenuAction::OpenHelp => {
                info!("Opening help page");
                if let Err(e) = open::that(PRODUCT_URL) {
                    warn!(error = ?e, "Failed to open browser");
                    self.notifier.show(&Alert::BrowserOpenFailed);
                }
            }
            MenuAction::CheckForUpdates => self.check_for_updates().await,
            // Quit never reaches here; the run loop breaks on it.
            MenuAction::Quit => {}
        }
    }

    /// Manual update check; every outcome is surfaced to the user.
    ///
    /// On an update or a failed check the browser also opens on the
    /// product page, so the user can act on the news right away.
    #[instrument(skip(self))]
    async fn check_for_updates(&self) {
        match self.update_checker.check_now().await {
            Ok(true) => {
                self.notifier.show(&Alert::UpdateAvailable);
                if let Err(e) = open::that(PRODUCT_URL) {
                    warn!(error = ?e, "Failed to open download page");
                }
            }
            Ok(false) => self.notifier.show(&Alert::UpToDate),
            Err(e) => {
                warn!(error = ?e, "Update check failed");
                self.notifier.show(&Alert::UpdateCheckFailed);
                if let Err(e) = open::that(PRODUCT_URL) {
                    warn!(error = ?e, "Failed to open download page");
                }
            }
        }
    }

    /// Mirror a supervisor state transition onto the tray indicator.
    fn update_tray(&self, state: BackendState) {
        let tray_state = TrayIconState::from(state);
        if let Err(e) = self.tray_proxy.send_event(TrayCommand::SetState(tray_state)) {
            warn!(error = ?e, "Failed to send tray state update");
        }
    }
}
