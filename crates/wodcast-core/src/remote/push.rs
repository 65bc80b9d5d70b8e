//! Push channel client
//!
//! Maintains the persistent WebSocket over which the server announces cursor
//! changes made by any controller. The connection is supervised: on failure
//! or mid-session drop it retries forever with a capped exponential backoff,
//! because the display is expected to run unattended for hours.
//!
//! This layer never filters or de-duplicates updates. The same logical state
//! may arrive here and in a navigation response; ordering them is the
//! playback engine's job via arrival sequence numbers.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::models::CurrentWorkout;
use crate::playback::{Inbox, SyncEvent};

/// Connection status of the push channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected
    Disconnected,
    /// Attempting to establish the channel
    Connecting,
    /// Channel established, updates flowing
    Connected,
}

/// First retry delay after a failed or dropped connection
const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Backoff cap
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Derive the push endpoint from the server base URL
pub fn push_url(server_url: &str) -> String {
    let base = server_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        format!("ws://{base}")
    };
    format!("{ws_base}/ws")
}

/// Inbound frames on the push channel
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
enum PushFrame {
    WorkoutChanged(CurrentWorkout),
}

/// Client for the server's push channel
pub struct PushClient {
    url: String,
    inbox: Inbox,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    state_rx: watch::Receiver<ConnectionState>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl PushClient {
    /// Create a client for the given server base URL
    ///
    /// Workout updates are forwarded into `inbox`; nothing happens until
    /// [`connect`](Self::connect) is called.
    pub fn new(server_url: &str, inbox: Inbox) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        Self {
            url: push_url(server_url),
            inbox,
            state_tx: Arc::new(state_tx),
            state_rx,
            shutdown_tx: None,
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Subscribe to connection state changes
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Start the supervised connection task
    ///
    /// No-op while a previous task is still alive, so calling this twice
    /// never produces a second connection.
    pub fn connect(&mut self) {
        if let Some(tx) = &self.shutdown_tx {
            if !tx.is_closed() {
                debug!("push channel already running");
                return;
            }
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        self.shutdown_tx = Some(shutdown_tx);

        tokio::spawn(connection_task(
            self.url.clone(),
            self.inbox.clone(),
            self.state_tx.clone(),
            shutdown_rx,
        ));
    }

    /// Tear the channel down and stop reconnecting
    pub fn disconnect(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
    }
}

/// Supervised connection loop: connect, listen, back off, repeat
async fn connection_task(
    url: String,
    inbox: Inbox,
    state: Arc<watch::Sender<ConnectionState>>,
    mut shutdown: mpsc::Receiver<()>,
) {
    let mut retry_delay = INITIAL_RETRY_DELAY;

    loop {
        let _ = state.send(ConnectionState::Connecting);

        match connect_async(&url).await {
            Ok((ws_stream, _)) => {
                info!(url = %url, "push channel connected");
                let _ = state.send(ConnectionState::Connected);
                retry_delay = INITIAL_RETRY_DELAY;

                if listen(ws_stream, &inbox, &mut shutdown).await {
                    break;
                }
                warn!("push channel lost, reconnecting");
            }
            Err(e) => {
                debug!("push connect failed: {e}");
            }
        }

        let _ = state.send(ConnectionState::Disconnected);

        tokio::select! {
            _ = tokio::time::sleep(retry_delay) => {
                retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
            }
            _ = shutdown.recv() => break,
        }
    }

    let _ = state.send(ConnectionState::Disconnected);
}

/// Listen until the connection drops or shutdown is requested
///
/// Returns true if shutdown was requested.
async fn listen(
    ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    inbox: &Inbox,
    shutdown: &mut mpsc::Receiver<()>,
) -> bool {
    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => handle_frame(&text, inbox),
                    Some(Ok(Message::Close(_))) | None => return false,
                    Some(Err(e)) => {
                        debug!("push channel error: {e}");
                        return false;
                    }
                    _ => {
                        // Ping/pong/binary - ignore
                    }
                }
            }
            _ = shutdown.recv() => {
                let _ = write.close().await;
                return true;
            }
        }
    }
}

fn handle_frame(text: &str, inbox: &Inbox) {
    match serde_json::from_str::<PushFrame>(text) {
        Ok(PushFrame::WorkoutChanged(workout)) => {
            debug!(id = workout.id, name = %workout.name, "workout changed");
            inbox.push(SyncEvent::Push(workout));
        }
        Err(e) => debug!("ignoring unrecognized push frame: {e}"),
    }
}
