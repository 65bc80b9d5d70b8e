//! Renderer command surface
//!
//! The engine drives a renderer through this trait and hears back through
//! [`RendererSignal`](super::RendererSignal) events on its inbox. Commands
//! are fire-and-forget: a renderer reports trouble as an `Error` signal
//! rather than a return value, so failures take the same serialized path as
//! every other state change.

use tracing::debug;

use super::event::{Inbox, RendererSignal, SyncEvent};

/// Commands the engine issues to whatever draws video
pub trait Renderer: Send {
    /// Start loading the given media URI; playback begins once ready
    fn load(&mut self, uri: &str);

    fn play(&mut self);

    fn pause(&mut self);

    /// Drop any loaded media and blank the surface
    fn clear(&mut self);
}

/// Headless renderer for running without a video surface
///
/// Acknowledges every load with an immediate `Ready` so the engine settles
/// into `Playing`, and never reports an end, leaving advancement to the
/// server and the remote.
pub struct SimRenderer {
    inbox: Inbox,
}

impl SimRenderer {
    pub fn new(inbox: Inbox) -> Self {
        Self { inbox }
    }
}

impl Renderer for SimRenderer {
    fn load(&mut self, uri: &str) {
        debug!(uri, "headless renderer: load");
        self.inbox.push(SyncEvent::Renderer(RendererSignal::Buffering));
        self.inbox.push(SyncEvent::Renderer(RendererSignal::Ready));
    }

    fn play(&mut self) {}

    fn pause(&mut self) {}

    fn clear(&mut self) {
        debug!("headless renderer: clear");
    }
}
