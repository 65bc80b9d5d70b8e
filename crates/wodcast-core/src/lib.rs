//! wodcast core library
//!
//! This crate provides the core of wodcast, a display client for a shared,
//! server-authoritative workout queue: the server owns the "what plays next"
//! cursor, controller devices move it, and this client shows whichever
//! workout is currently selected.
//!
//! # Architecture
//!
//! Two independent channels feed one state machine:
//!
//! - `remote::PushClient` delivers unsolicited cursor changes over a
//!   persistent WebSocket with supervised reconnection.
//! - `remote::ApiClient` performs request/response operations (bootstrap
//!   fetch, navigation, group selection).
//! - `playback::PlaybackEngine` serializes everything through one inbox,
//!   orders events by arrival, and drives a `playback::Renderer`.
//!
//! Renderer completion feeds back into the engine as an auto-advance
//! navigation, through the same ordered path as user input.
//!
//! # Modules
//!
//! - `models`: wire data model for the workout server
//! - `config`: application configuration
//! - `remote`: HTTP gateway and push channel
//! - `playback`: the playback engine and renderer surface

pub mod config;
pub mod models;
pub mod playback;
pub mod remote;

pub use config::Config;
pub use models::{CurrentWorkout, NavigateDirection, ServerState, WorkoutGroup, WorkoutStatus};
pub use playback::{
    Inbox, Phase, PlaybackEngine, PlaybackHandle, Renderer, RenderState, RendererSignal,
    SimRenderer, SyncEvent,
};
pub use remote::{ApiClient, ApiError, ConnectionState, Gateway, PushClient};
