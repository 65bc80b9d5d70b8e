//! Playback engine
//!
//! The single owner of "what should currently be shown". Push updates,
//! navigation responses, the bootstrap snapshot and renderer callbacks all
//! arrive through one inbox and are applied one at a time; the display is
//! replaced only by an event whose arrival sequence number is greater than
//! that of the last applied event. That one rule keeps the screen from
//! rolling backward when an old in-flight navigation response lands after a
//! newer push update.
//!
//! End-of-video feeds back into the same path: a finished video issues the
//! same navigate request a remote button does, and the response competes on
//! sequence number like everything else.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::models::{CurrentWorkout, NavigateDirection, WorkoutStatus};
use crate::remote::Gateway;

use super::event::{Command, Inbox, Input, RendererSignal, Seq, SyncEvent};
use super::renderer::Renderer;

/// Where the display is in a workout's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing selected
    Empty,
    /// A workout is selected but its video cannot play yet
    AwaitingMedia,
    /// Video handed to the renderer, waiting for frames
    Buffering,
    Playing,
    Paused,
    /// Video finished; auto-advance is in flight
    Ended,
}

/// The engine's published view of the display
#[derive(Debug, Clone)]
pub struct RenderState {
    pub workout: Option<CurrentWorkout>,
    pub phase: Phase,
    /// Transient viewer-facing text (status notes, failures)
    pub message: Option<String>,
    /// Controller pairing code, captured at bootstrap
    pub pairing_code: Option<String>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            workout: None,
            phase: Phase::Empty,
            message: None,
            pairing_code: None,
        }
    }
}

/// Deferred side effect of applying an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Followup {
    Navigate(NavigateDirection),
}

/// Control handle for a running engine
#[derive(Clone)]
pub struct PlaybackHandle {
    inbox: Inbox,
    state_rx: watch::Receiver<RenderState>,
}

impl PlaybackHandle {
    /// Producer handle for feeding events (push channel, renderer adapters)
    pub fn inbox(&self) -> Inbox {
        self.inbox.clone()
    }

    /// Subscribe to display state changes
    pub fn subscribe(&self) -> watch::Receiver<RenderState> {
        self.state_rx.clone()
    }

    /// Fetch the full server state and apply it
    pub fn bootstrap(&self) {
        self.inbox.command(Command::Bootstrap);
    }

    pub fn previous(&self) {
        self.inbox.command(Command::Previous);
    }

    pub fn next(&self) {
        self.inbox.command(Command::Next);
    }

    pub fn toggle_play_pause(&self) {
        self.inbox.command(Command::TogglePlayPause);
    }

    pub fn select_group(&self, group_id: i64) {
        self.inbox.command(Command::SelectGroup(group_id));
    }

    /// Stop the engine; the renderer is cleared on the way out
    pub fn shutdown(&self) {
        self.inbox.command(Command::Shutdown);
    }
}

/// The playback state machine
pub struct PlaybackEngine {
    state: RenderState,
    /// Sequence number of the event that last replaced the display
    last_applied: Seq,
    renderer: Box<dyn Renderer>,
    gateway: Arc<dyn Gateway>,
    inbox: Inbox,
    rx: mpsc::UnboundedReceiver<Input>,
    state_tx: watch::Sender<RenderState>,
}

impl PlaybackEngine {
    /// Create an engine and its control handle
    ///
    /// The renderer is built from the engine's own inbox so its callbacks
    /// take the same serialized path as every other input.
    pub fn new(
        gateway: Arc<dyn Gateway>,
        make_renderer: impl FnOnce(Inbox) -> Box<dyn Renderer>,
    ) -> (Self, PlaybackHandle) {
        let (inbox, rx) = Inbox::channel();
        let renderer = make_renderer(inbox.clone());
        let (state_tx, state_rx) = watch::channel(RenderState::default());

        let engine = Self {
            state: RenderState::default(),
            last_applied: 0,
            renderer,
            gateway,
            inbox: inbox.clone(),
            rx,
            state_tx,
        };
        let handle = PlaybackHandle { inbox, state_rx };
        (engine, handle)
    }

    /// Consume inputs until shutdown
    ///
    /// This is the only place display state is ever mutated; producers run
    /// concurrently but their inputs are applied strictly one at a time.
    pub async fn run(mut self) {
        while let Some(input) = self.rx.recv().await {
            if !self.handle_input(input) {
                break;
            }
            self.publish();
        }
        // Deterministic teardown: blank the surface before the task ends
        self.renderer.clear();
    }

    /// Apply one input. Returns false when the engine should stop.
    fn handle_input(&mut self, input: Input) -> bool {
        match input {
            Input::Command(Command::Shutdown) => return false,
            Input::Command(command) => self.handle_command(command),
            Input::Event { seq, event } => {
                if let Some(Followup::Navigate(direction)) = self.apply_event(seq, event) {
                    self.request_navigate(direction);
                }
            }
            Input::Notice(text) => self.state.message = Some(text),
        }
        true
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Previous => self.request_navigate(NavigateDirection::Prev),
            Command::Next => self.request_navigate(NavigateDirection::Next),
            Command::TogglePlayPause => self.toggle_play_pause(),
            Command::SelectGroup(group_id) => self.request_select_group(group_id),
            Command::Bootstrap => self.request_bootstrap(),
            Command::Shutdown => {}
        }
    }

    /// Local play/pause toggle; never touches the network
    fn toggle_play_pause(&mut self) {
        match self.state.phase {
            Phase::Playing => {
                self.renderer.pause();
                self.state.phase = Phase::Paused;
            }
            Phase::Paused => {
                self.renderer.play();
                self.state.phase = Phase::Playing;
            }
            _ => {}
        }
    }

    fn request_navigate(&self, direction: NavigateDirection) {
        let gateway = self.gateway.clone();
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            match gateway.navigate(direction).await {
                // The sequence number is assigned when the response arrives,
                // so a superseded request loses to whatever beat it here
                Ok(outcome) => {
                    inbox.push(SyncEvent::Navigated(outcome));
                }
                Err(e) => {
                    warn!("navigation failed: {e}");
                    inbox.notice(format!("Navigation failed: {e}"));
                }
            }
        });
    }

    fn request_bootstrap(&self) {
        let gateway = self.gateway.clone();
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            match gateway.state().await {
                Ok(state) => {
                    inbox.push(SyncEvent::Bootstrap(state));
                }
                Err(e) => {
                    warn!("state fetch failed: {e}");
                    inbox.notice(format!("Cannot reach server: {e}"));
                }
            }
        });
    }

    fn request_select_group(&self, group_id: i64) {
        let gateway = self.gateway.clone();
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            match gateway.select_group(group_id).await {
                Ok(availability) => {
                    debug!(group_id, workouts = availability.len(), "group selected");
                    // The matching cursor change arrives as a push update
                }
                Err(e) => {
                    warn!("group selection failed: {e}");
                    inbox.notice(format!("Group selection failed: {e}"));
                }
            }
        });
    }

    fn apply_event(&mut self, seq: Seq, event: SyncEvent) -> Option<Followup> {
        match event {
            SyncEvent::Bootstrap(state) => {
                self.state.pairing_code = Some(state.pairing_code);
                match state.current_workout {
                    Some(workout) => self.apply_workout(seq, workout),
                    None => {
                        if seq > self.last_applied {
                            self.last_applied = seq;
                            self.renderer.clear();
                            self.state.workout = None;
                            self.state.phase = Phase::Empty;
                            self.state.message =
                                Some("Select a workout from your controller".to_string());
                        }
                        None
                    }
                }
            }
            SyncEvent::Push(workout) => self.apply_workout(seq, workout),
            SyncEvent::Navigated(Some(workout)) => self.apply_workout(seq, workout),
            SyncEvent::Navigated(None) => {
                // Boundary reached: newer than anything applied so far, but
                // changes nothing on screen
                if seq > self.last_applied {
                    self.last_applied = seq;
                }
                None
            }
            SyncEvent::Renderer(signal) => self.apply_renderer_signal(signal),
        }
    }

    /// Replace the display only with a strictly newer event, no matter which
    /// channel delivered it
    fn apply_workout(&mut self, seq: Seq, workout: CurrentWorkout) -> Option<Followup> {
        if seq <= self.last_applied {
            debug!(
                seq,
                last_applied = self.last_applied,
                id = workout.id,
                "discarding stale update"
            );
            return None;
        }
        self.last_applied = seq;
        self.state.message = None;

        if workout.is_playable() {
            let uri = self
                .gateway
                .media_url(workout.video_url.as_deref().unwrap_or_default());
            info!(id = workout.id, name = %workout.name, "starting workout video");
            self.renderer.load(&uri);
            self.renderer.play();
            self.state.phase = Phase::Buffering;
        } else {
            self.renderer.clear();
            self.state.phase = Phase::AwaitingMedia;
            self.state.message = Some(match workout.status {
                WorkoutStatus::Ready => "Video not available".to_string(),
                status => status.label().to_string(),
            });
        }

        self.state.workout = Some(workout);
        None
    }

    fn apply_renderer_signal(&mut self, signal: RendererSignal) -> Option<Followup> {
        match signal {
            RendererSignal::Buffering => {
                if self.state.phase == Phase::Playing {
                    self.state.phase = Phase::Buffering;
                }
            }
            RendererSignal::Ready => {
                if self.state.phase == Phase::Buffering {
                    self.state.phase = Phase::Playing;
                }
            }
            RendererSignal::Ended => {
                // Auto-advance exactly once per finished video
                if self.state.phase == Phase::Playing {
                    info!("video ended, advancing");
                    self.state.phase = Phase::Ended;
                    return Some(Followup::Navigate(NavigateDirection::Next));
                }
            }
            RendererSignal::Error(reason) => {
                if self.state.workout.is_some() {
                    warn!("renderer error: {reason}");
                    self.renderer.clear();
                    self.state.phase = Phase::AwaitingMedia;
                    self.state.message = Some(format!("Playback error: {reason}"));
                }
            }
        }
        None
    }

    fn publish(&self) {
        let _ = self.state_tx.send(self.state.clone());
    }
}
