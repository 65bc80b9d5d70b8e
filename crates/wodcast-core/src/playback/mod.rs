//! Playback synchronization
//!
//! Keeps the local display consistent with a server-side cursor that several
//! controllers can move at once, while updates arrive over two channels with
//! independent latencies (push notifications and request responses).
//!
//! ## Approach
//!
//! 1. Every input is funneled into one inbox and applied by a single task.
//! 2. State-bearing events are stamped with an arrival-order sequence number
//!    shared across all producers.
//! 3. The display is replaced only by a strictly newer event, so a slow
//!    response can never roll the screen back past a faster push update.
//! 4. End-of-video re-enters the same navigation path as user input.
//!
//! ## Usage
//!
//! ```ignore
//! let (engine, handle) = PlaybackEngine::new(gateway, |inbox| Box::new(SimRenderer::new(inbox)));
//! tokio::spawn(engine.run());
//! handle.bootstrap();
//! ```

pub(crate) mod event;
mod engine;
mod renderer;

pub use engine::{Phase, PlaybackEngine, PlaybackHandle, RenderState};
pub use event::{Inbox, RendererSignal, Seq, SyncEvent};
pub use renderer::{Renderer, SimRenderer};
