//! mpv process driver and one-shot control IPC.
//!
//! The player is spawned idle with a fresh `--input-ipc-server` socket.  The
//! child is owned by a monitor task that reports exactly one
//! `AppEvent::PlayerExited` when the process ends, whether it quit, crashed,
//! or was killed through the handle's kill channel.  The engine never holds
//! the `Child` itself, so "socket path without a process" is unrepresentable.
//!
//! Control messages are one connection each: connect (retrying while mpv is
//! still starting up), write one JSON line, optionally read one reply line,
//! close.  No connection outlives a single request.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use cram_core::config::LofiConfig;
use cram_core::platform;

use crate::event::AppEvent;

/// Audible-playback threshold for the `playback-time` query: anything above
/// this many seconds counts as playing.
pub const PLAYBACK_EPSILON: f64 = 0.05;

/// A running player process: its control-socket path and a channel that makes
/// the monitor task kill the child.  Dropping the handle does not kill the
/// process; teardown is always explicit.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    pub socket: PathBuf,
    kill_tx: mpsc::Sender<()>,
}

impl PlayerHandle {
    /// Ask the monitor task to terminate the child.  Best-effort and
    /// non-blocking; the exit is reported through the normal exit event.
    pub fn kill(&self) {
        let _ = self.kill_tx.try_send(());
    }

    #[cfg(test)]
    pub fn fake(socket: impl Into<PathBuf>) -> Self {
        let (kill_tx, _rx) = mpsc::channel(1);
        Self {
            socket: socket.into(),
            kill_tx,
        }
    }
}

/// Spawn mpv idle on a freshly chosen socket and start its monitor task.
pub fn spawn_player(events: mpsc::Sender<AppEvent>) -> anyhow::Result<PlayerHandle> {
    let binary = platform::find_mpv_binary()
        .ok_or_else(|| anyhow::anyhow!("mpv not found; install mpv to enable Lofi playback"))?;

    let socket = platform::fresh_player_socket();
    let _ = std::fs::remove_file(&socket);

    let child = Command::new(&binary)
        .arg("--no-video")
        .arg("--really-quiet")
        .arg(format!("--input-ipc-server={}", socket.display()))
        .arg("--idle=yes")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .kill_on_drop(true)
        .spawn()?;
    info!("lofi: spawned mpv pid={:?} socket={}", child.id(), socket.display());

    let (kill_tx, kill_rx) = mpsc::channel(1);
    tokio::spawn(monitor(child, kill_rx, socket.clone(), events));

    Ok(PlayerHandle { socket, kill_tx })
}

/// Own the child until it exits; deliver exactly one exit event.
async fn monitor(
    mut child: tokio::process::Child,
    mut kill_rx: mpsc::Receiver<()>,
    socket: PathBuf,
    events: mpsc::Sender<AppEvent>,
) {
    let error = tokio::select! {
        status = child.wait() => match status {
            Ok(status) if status.success() => None,
            Ok(status) => Some(format!("player exited: {status}")),
            Err(e) => Some(format!("player wait failed: {e}")),
        },
        _ = kill_rx.recv() => {
            let _ = child.start_kill();
            let _ = child.wait().await;
            None
        }
    };
    let _ = std::fs::remove_file(&socket);
    debug!("lofi: player exited (error={:?})", error);
    let _ = events.send(AppEvent::PlayerExited { socket, error }).await;
}

// ── control messages ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ControlMsg {
    /// Replace whatever is loaded with the playlist URL.
    Load(String),
    /// Jump to a playlist index.
    PlayIndex(usize),
    Next,
    Prev,
    TogglePause,
    Stop,
    Quit,
}

impl ControlMsg {
    fn to_command(&self) -> serde_json::Value {
        match self {
            ControlMsg::Load(url) => json!(["loadfile", url, "replace"]),
            ControlMsg::PlayIndex(i) => json!(["playlist-play-index", i]),
            ControlMsg::Next => json!(["playlist-next", "force"]),
            ControlMsg::Prev => json!(["playlist-prev", "force"]),
            ControlMsg::TogglePause => json!(["cycle", "pause"]),
            ControlMsg::Stop => json!(["stop"]),
            ControlMsg::Quit => json!(["quit"]),
        }
    }
}

/// One reply line from the player.  `error == "success"` signals an answered
/// query; any other value is treated as "no data" by the poll path.
#[derive(Debug, Deserialize)]
pub struct ControlReply {
    pub error: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Connect to the control socket, retrying while the player starts up.
async fn connect(socket: &Path, cfg: &LofiConfig) -> anyhow::Result<UnixStream> {
    let mut last_err = None;
    for attempt in 0..cfg.connect_retries.max(1) {
        match UnixStream::connect(socket).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!("lofi: socket connect attempt {} failed: {}", attempt + 1, e);
                last_err = Some(e);
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(cfg.connect_retry_delay_ms)).await;
    }
    Err(anyhow::anyhow!(
        "player socket unavailable: {}",
        last_err.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Fire one command, no reply expected.
pub async fn send_control(socket: &Path, msg: &ControlMsg, cfg: &LofiConfig) -> anyhow::Result<()> {
    let mut stream = connect(socket, cfg).await?;
    let mut line = serde_json::to_string(&json!({ "command": msg.to_command() }))?;
    line.push('\n');
    stream.write_all(line.as_bytes()).await?;
    Ok(())
}

/// Fire one query and read its single reply line.
async fn send_request(
    socket: &Path,
    command: serde_json::Value,
    cfg: &LofiConfig,
) -> anyhow::Result<ControlReply> {
    let mut stream = connect(socket, cfg).await?;
    let mut line = serde_json::to_string(&json!({ "command": command, "request_id": 1 }))?;
    line.push('\n');
    stream.write_all(line.as_bytes()).await?;

    let mut reader = BufReader::new(stream);
    let mut reply = String::new();
    loop {
        reply.clear();
        let n = reader.read_line(&mut reply).await?;
        if n == 0 {
            anyhow::bail!("player closed the control socket mid-request");
        }
        // The player may push unsolicited event lines on a fresh connection;
        // only the line echoing our request_id is the reply.
        match serde_json::from_str::<serde_json::Value>(reply.trim()) {
            Ok(val) if val.get("request_id").is_some() => {
                return Ok(serde_json::from_value(val)?);
            }
            Ok(_) => continue,
            Err(e) => {
                warn!("lofi: malformed reply line '{}': {}", reply.trim(), e);
                anyhow::bail!("malformed player reply");
            }
        }
    }
}

/// Ask whether something is audibly playing: a `playback-time` above the
/// epsilon counts, an unanswered query counts as "not yet".
pub async fn query_playing(socket: &Path, cfg: &LofiConfig) -> anyhow::Result<bool> {
    let reply = send_request(socket, json!(["get_property", "playback-time"]), cfg).await?;
    if reply.error != "success" {
        return Ok(false);
    }
    Ok(reply.data.as_f64().map_or(false, |v| v > PLAYBACK_EPSILON))
}
