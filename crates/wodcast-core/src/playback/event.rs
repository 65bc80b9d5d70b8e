//! Playback engine inputs
//!
//! Everything that reaches the engine goes through one inbox: push updates,
//! navigation responses, the bootstrap snapshot, renderer callbacks, user
//! commands. State-bearing events are stamped with an arrival-order sequence
//! number from a counter shared by every producer; an update is applied only
//! if its number is greater than the last applied one. That single total
//! order is what resolves races between the push channel and in-flight
//! request responses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::models::{CurrentWorkout, ServerState};

/// Arrival-order sequence number
///
/// Numbering starts at 1; the engine uses 0 for "nothing applied yet".
pub type Seq = u64;

/// Callbacks from whatever is rendering video
#[derive(Debug, Clone, PartialEq)]
pub enum RendererSignal {
    /// Media is loading or stalled
    Buffering,
    /// Media is ready and frames are flowing
    Ready,
    /// Media played to the end
    Ended,
    /// Playback failed
    Error(String),
}

/// A state-bearing input from one of the server channels or the renderer
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Unsolicited cursor change delivered over the push channel
    Push(CurrentWorkout),
    /// Outcome of a navigate request. `None` means the cursor did not move
    /// (boundary reached), never "clear the screen".
    Navigated(Option<CurrentWorkout>),
    /// Full server state fetched at startup
    Bootstrap(ServerState),
    /// Renderer callback
    Renderer(RendererSignal),
}

/// User- or client-issued commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Previous,
    Next,
    /// Purely local; never touches the network
    TogglePlayPause,
    SelectGroup(i64),
    /// Fetch the full server state and apply it
    Bootstrap,
    /// Stop the engine, clearing the renderer on the way out
    Shutdown,
}

/// One serialized engine input
#[derive(Debug)]
pub(crate) enum Input {
    Event { seq: Seq, event: SyncEvent },
    Command(Command),
    /// Transient user-visible text; never touches playback state
    Notice(String),
}

/// Producer handle for the engine's inbox
///
/// Clones share one sequence counter, so event numbering stays total across
/// all producers regardless of which task enqueues first.
#[derive(Clone)]
pub struct Inbox {
    tx: mpsc::UnboundedSender<Input>,
    counter: Arc<AtomicU64>,
}

impl Inbox {
    /// Create an inbox and the receiving end the engine consumes
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<Input>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let inbox = Self {
            tx,
            counter: Arc::new(AtomicU64::new(0)),
        };
        (inbox, rx)
    }

    /// Enqueue a state-bearing event, stamping it at arrival
    ///
    /// Returns the assigned sequence number. Delivery failure (engine gone)
    /// is ignored: producers outliving the engine have nothing left to do.
    pub fn push(&self, event: SyncEvent) -> Seq {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let _ = self.tx.send(Input::Event { seq, event });
        seq
    }

    pub(crate) fn command(&self, command: Command) {
        let _ = self.tx.send(Input::Command(command));
    }

    pub(crate) fn notice(&self, text: impl Into<String>) {
        let _ = self.tx.send(Input::Notice(text.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutStatus;

    fn workout(id: i64) -> CurrentWorkout {
        CurrentWorkout {
            id,
            name: format!("workout {id}"),
            status: WorkoutStatus::Ready,
            video_url: Some(format!("/videos/{id}.mp4")),
        }
    }

    #[test]
    fn test_sequence_numbers_start_at_one() {
        let (inbox, _rx) = Inbox::channel();
        assert_eq!(inbox.push(SyncEvent::Push(workout(1))), 1);
        assert_eq!(inbox.push(SyncEvent::Push(workout(2))), 2);
    }

    #[test]
    fn test_clones_share_the_counter() {
        let (inbox, _rx) = Inbox::channel();
        let other = inbox.clone();

        let a = inbox.push(SyncEvent::Push(workout(1)));
        let b = other.push(SyncEvent::Renderer(RendererSignal::Ready));
        let c = inbox.push(SyncEvent::Navigated(None));

        assert!(a < b && b < c);
    }

    #[test]
    fn test_push_survives_dropped_receiver() {
        let (inbox, rx) = Inbox::channel();
        drop(rx);
        // Still assigns a number; delivery is best-effort
        assert_eq!(inbox.push(SyncEvent::Push(workout(1))), 1);
    }
}
