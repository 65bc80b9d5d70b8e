//! mpv renderer adapter
//!
//! Drives a spawned mpv process over its JSON IPC socket and reports the
//! player's lifecycle back as renderer signals through the engine inbox.
//! mpv runs with `--idle` so the window survives between videos; a dead or
//! missing player surfaces as a playback error, not a crash.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use wodcast_core::{Inbox, Renderer, RendererSignal, SyncEvent};

/// How long to wait for mpv's IPC socket to appear after spawn
const SOCKET_WAIT: Duration = Duration::from_secs(5);

#[derive(Debug)]
enum MpvCommand {
    Load(String),
    Play,
    Pause,
    Clear,
}

/// Renderer backed by an mpv process
pub struct MpvRenderer {
    tx: mpsc::UnboundedSender<MpvCommand>,
}

impl MpvRenderer {
    /// Spawn the mpv manager task
    ///
    /// mpv itself is launched on the first load, so a missing binary shows
    /// up as a playback error on screen rather than a startup failure.
    pub fn new(inbox: Inbox) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(manager(rx, inbox));
        Self { tx }
    }
}

impl Renderer for MpvRenderer {
    fn load(&mut self, uri: &str) {
        let _ = self.tx.send(MpvCommand::Load(uri.to_string()));
    }

    fn play(&mut self) {
        let _ = self.tx.send(MpvCommand::Play);
    }

    fn pause(&mut self) {
        let _ = self.tx.send(MpvCommand::Pause);
    }

    fn clear(&mut self) {
        let _ = self.tx.send(MpvCommand::Clear);
    }
}

async fn manager(mut rx: mpsc::UnboundedReceiver<MpvCommand>, inbox: Inbox) {
    let mut session: Option<MpvSession> = None;

    while let Some(command) = rx.recv().await {
        if session.is_none() {
            // Control commands without a player have nothing to act on
            if !matches!(command, MpvCommand::Load(_)) {
                continue;
            }
            match MpvSession::start(inbox.clone()).await {
                Ok(s) => session = Some(s),
                Err(e) => {
                    warn!("failed to start mpv: {e}");
                    inbox.push(SyncEvent::Renderer(RendererSignal::Error(format!(
                        "video player unavailable: {e}"
                    ))));
                    continue;
                }
            }
        }

        let Some(player) = session.as_mut() else {
            continue;
        };
        let result = match &command {
            MpvCommand::Load(uri) => match player.send(json!(["loadfile", uri])).await {
                Ok(()) => player.send(json!(["set_property", "pause", false])).await,
                Err(e) => Err(e),
            },
            MpvCommand::Play => player.send(json!(["set_property", "pause", false])).await,
            MpvCommand::Pause => player.send(json!(["set_property", "pause", true])).await,
            MpvCommand::Clear => player.send(json!(["stop"])).await,
        };

        if let Err(e) = result {
            warn!("mpv command failed: {e}");
            inbox.push(SyncEvent::Renderer(RendererSignal::Error(
                "video player exited".to_string(),
            )));
            // A later load respawns the player
            session = None;
        }
    }

    // Engine gone: stop the player
    if let Some(mut player) = session {
        let _ = player.send(json!(["quit"])).await;
    }
}

/// A running mpv process and the write side of its IPC socket
struct MpvSession {
    _child: Child,
    writer: OwnedWriteHalf,
}

impl MpvSession {
    async fn start(inbox: Inbox) -> io::Result<Self> {
        let socket_path = ipc_socket_path();
        let _ = std::fs::remove_file(&socket_path);

        let child = Command::new("mpv")
            .arg("--idle=yes")
            .arg("--force-window=yes")
            .arg("--fullscreen")
            .arg("--no-terminal")
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .kill_on_drop(true)
            .spawn()?;

        let stream = wait_for_socket(&socket_path).await?;
        let (read_half, write_half) = stream.into_split();
        tokio::spawn(read_events(read_half, inbox));

        debug!(socket = %socket_path.display(), "mpv started");
        Ok(Self {
            _child: child,
            writer: write_half,
        })
    }

    async fn send(&mut self, command: Value) -> io::Result<()> {
        let mut line = json!({ "command": command }).to_string();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await
    }
}

fn ipc_socket_path() -> PathBuf {
    std::env::temp_dir().join(format!("wodcast-mpv-{}.sock", std::process::id()))
}

async fn wait_for_socket(path: &Path) -> io::Result<UnixStream> {
    let deadline = tokio::time::Instant::now() + SOCKET_WAIT;
    loop {
        match UnixStream::connect(path).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                if tokio::time::Instant::now() >= deadline {
                    return Err(e);
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}

/// Translate mpv's event stream into renderer signals
async fn read_events(read_half: OwnedReadHalf, inbox: Inbox) {
    let mut lines = BufReader::new(read_half).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(value) = serde_json::from_str::<Value>(&line) else {
            continue;
        };
        if let Some(signal) = signal_for(&value) {
            debug!(?signal, "mpv event");
            inbox.push(SyncEvent::Renderer(signal));
        }
    }
    debug!("mpv event stream closed");
}

fn signal_for(value: &Value) -> Option<RendererSignal> {
    match value.get("event").and_then(Value::as_str)? {
        "start-file" => Some(RendererSignal::Buffering),
        "playback-restart" => Some(RendererSignal::Ready),
        "end-file" => match value.get("reason").and_then(Value::as_str) {
            Some("eof") => Some(RendererSignal::Ended),
            Some("error") => Some(RendererSignal::Error(
                value
                    .get("file_error")
                    .and_then(Value::as_str)
                    .unwrap_or("playback failed")
                    .to_string(),
            )),
            // stop/quit/redirect are consequences of our own commands
            _ => None,
        },
        _ => None,
    }
}
