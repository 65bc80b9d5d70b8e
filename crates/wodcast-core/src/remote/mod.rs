//! Server communication
//!
//! Two independent channels to the workout server:
//!
//! - `api`: request/response operations over HTTP (fetch state, navigate,
//!   select group). Fallible, never retried here.
//! - `push`: a persistent WebSocket that delivers `workout_changed`
//!   notifications whenever any controller moves the cursor, with
//!   supervised reconnection.
//!
//! Both feed the playback engine's inbox; neither applies state itself.

mod api;
mod push;

pub use api::{ApiClient, ApiError, Gateway};
pub use push::{push_url, ConnectionState, PushClient};
