//! Loopback TCP listener for engine touch events.
//!
//! Binds an ephemeral port, publishes the assigned port to the controller
//! once, then accepts connections until shutdown. Each connection is read
//! as newline-delimited records; anything that is not exactly two
//! comma-separated fields is dropped.

use crate::{
    Alert, CoreResult, MonitorError,
    listener::{DebounceGate, TouchEvent},
    supervisor::BackendSupervisor,
};

use std::{
    panic::Location,
    sync::Arc,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::{Mutex, mpsc, oneshot, watch},
};
use tracing::{debug, info, instrument, warn};

/// Suppression window between touch notifications.
const TOUCH_DEBOUNCE_WINDOW: Duration = Duration::from_secs(1);

/// Loopback listen address; port zero lets the OS assign one.
const LISTEN_ADDR: &str = "127.0.0.1:0";

/// Accepts engine connections and turns touch records into alerts.
///
/// Connections share one debounce gate, so alert pacing is process-wide
/// no matter how often the engine reconnects. Every valid record is also
/// reported to the supervisor as liveness evidence.
pub struct EventListener {
    supervisor: BackendSupervisor,
    alert_tx: mpsc::Sender<Alert>,
    gate: Arc<Mutex<DebounceGate>>,
}

impl EventListener {
    /// Create a listener reporting liveness to `supervisor` and touch
    /// alerts on `alert_tx`.
    pub fn new(supervisor: BackendSupervisor, alert_tx: mpsc::Sender<Alert>) -> Self {
        Self {
            supervisor,
            alert_tx,
            gate: Arc::new(Mutex::new(DebounceGate::new(TOUCH_DEBOUNCE_WINDOW))),
        }
    }

    /// Bind, publish the assigned port on `port_tx`, and accept
    /// connections until `shutdown_rx` fires.
    ///
    /// A bind failure returns before the port is published; the controller
    /// treats the dropped sender as fatal.
    #[instrument(skip_all)]
    pub async fn run(
        self,
        port_tx: oneshot::Sender<u16>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> CoreResult<()> {
        let listener =
            TcpListener::bind(LISTEN_ADDR)
                .await
                .map_err(|e| MonitorError::ListenerBind {
                    source: e,
                    location: ErrorLocation::from(Location::caller()),
                })?;
        let port = listener.local_addr()?.port();

        info!(port, "Event listener started");
        let _ = port_tx.send(port);

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Event listener shutting down");
                    break;
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            debug!(%peer, "Engine connected");
                            let supervisor = self.supervisor.clone();
                            let alert_tx = self.alert_tx.clone();
                            let gate = Arc::clone(&self.gate);
                            tokio::spawn(async move {
                                handle_connection(stream, supervisor, alert_tx, gate).await;
                            });
                        }
                        Err(e) => warn!(error = ?e, "Failed to accept engine connection"),
                    }
                }
            }
        }

        Ok(())
    }
}

/// Read one connection to EOF, processing each valid touch record.
async fn handle_connection(
    stream: TcpStream,
    supervisor: BackendSupervisor,
    alert_tx: mpsc::Sender<Alert>,
    gate: Arc<Mutex<DebounceGate>>,
) {
    let mut lines = BufReader::new(stream).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Some(event) = TouchEvent::parse(&line) else {
                    debug!(line = %line, "Dropped malformed event record");
                    continue;
                };

                info!(body_part = %event.body_part, source = %event.source, "Touch reported");
                supervisor.on_liveness_signal().await;

                let fire = gate.lock().await.observe(Instant::now());
                if fire {
                    let _ = alert_tx
                        .send(Alert::Touch {
                            body_part: event.body_part,
                        })
                        .await;
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!(error = ?e, "Engine connection read error");
                break;
            }
        }
    }

    debug!("Engine disconnected");
}
