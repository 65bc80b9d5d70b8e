//! Application state for the player screen

use tokio::sync::watch;
use wodcast_core::{ConnectionState, RenderState};

/// Read-side of the running client, polled by the draw loop
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    state_rx: watch::Receiver<RenderState>,
    connection_rx: watch::Receiver<ConnectionState>,
}

impl App {
    pub fn new(
        state_rx: watch::Receiver<RenderState>,
        connection_rx: watch::Receiver<ConnectionState>,
    ) -> Self {
        Self {
            should_quit: false,
            state_rx,
            connection_rx,
        }
    }

    /// Latest published display state
    pub fn render_state(&self) -> RenderState {
        self.state_rx.borrow().clone()
    }

    /// Latest push channel state
    pub fn connection(&self) -> ConnectionState {
        *self.connection_rx.borrow()
    }
}
