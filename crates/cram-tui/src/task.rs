//! Background tasks — the deferred work a reducer step schedules.
//!
//! The engine never blocks: anything involving a subprocess, the control
//! socket, or a delay becomes a `Task`.  `spawn` runs each task on the tokio
//! runtime, and every task sends exactly one completion event back on the
//! engine's channel.  The one exception is `ShutdownPlayer`, whose completion
//! is the `PlayerExited` event delivered by the process monitor it triggers.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use cram_core::config::LofiConfig;

use crate::event::AppEvent;
use crate::lofi::player::{self, ControlMsg, PlayerHandle};
use crate::lofi::playlist;

#[derive(Debug)]
pub enum Task {
    /// Resolve playlist entries for `url` with yt-dlp.
    FetchPlaylist { url: String },
    /// Wait out the seek delay, then report the index to jump to.
    DeferSeek { socket: PathBuf, index: usize },
    /// Wait one poll interval, then ask the player whether audio is flowing.
    PollPlayback { socket: PathBuf, attempts: u32 },
    /// Deliver a single control message over a fresh connection.
    Control { socket: PathBuf, msg: ControlMsg },
    /// Graceful quit, then force kill.  Exit is reported by the monitor.
    ShutdownPlayer { handle: PlayerHandle },
}

pub fn spawn(task: Task, tx: mpsc::Sender<AppEvent>, lofi: &LofiConfig) {
    debug!("task: spawning {:?}", task);
    let lofi = lofi.clone();
    match task {
        Task::FetchPlaylist { url } => {
            tokio::spawn(async move {
                let result = playlist::fetch(&url).await.map_err(|e| e.to_string());
                let _ = tx.send(AppEvent::PlaylistLoaded(result)).await;
            });
        }
        Task::DeferSeek { socket, index } => {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(lofi.seek_delay_ms)).await;
                let _ = tx.send(AppEvent::SeekDue { socket, index }).await;
            });
        }
        Task::PollPlayback { socket, attempts } => {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(lofi.poll_interval_ms)).await;
                let (playing, error) = match player::query_playing(&socket, &lofi).await {
                    Ok(playing) => (playing, None),
                    Err(e) => (false, Some(e.to_string())),
                };
                let _ = tx
                    .send(AppEvent::PlaybackPolled {
                        socket,
                        playing,
                        attempts,
                        error,
                    })
                    .await;
            });
        }
        Task::Control { socket, msg } => {
            tokio::spawn(async move {
                let result = player::send_control(&socket, &msg, &lofi)
                    .await
                    .map_err(|e| e.to_string());
                let _ = tx.send(AppEvent::ControlSent { socket, result }).await;
            });
        }
        Task::ShutdownPlayer { handle } => {
            tokio::spawn(async move {
                let _ = player::send_control(&handle.socket, &ControlMsg::Quit, &lofi).await;
                handle.kill();
            });
        }
    }
}
