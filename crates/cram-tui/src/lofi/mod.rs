//! Lofi subsystem — the state machine around one external player process.
//!
//! All transitions here are synchronous reducer helpers: they mutate
//! `LofiState` and return the background tasks to schedule.  Socket I/O,
//! timers, and the playlist fetch never happen inline.  Completion events
//! re-enter through the `apply_*` methods, each of which guards against
//! results from a player that has since been torn down or replaced.

pub mod player;
pub mod playlist;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

use cram_core::model::LofiTrack;
use cram_core::platform;

use crate::event::AppEvent;
use crate::task::Task;

pub use player::{ControlMsg, PlayerHandle};

#[derive(Debug, Error)]
pub enum LofiError {
    #[error("enable Lofi in Settings first")]
    Disabled,
    #[error("set a playlist URL in Settings")]
    NoUrl,
    #[error("mpv not found; install mpv to enable Lofi playback")]
    PlayerMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LofiStatus {
    Stopped,
    Loading,
    Playing,
    Paused,
}

impl LofiStatus {
    pub fn label(self) -> &'static str {
        match self {
            LofiStatus::Stopped => "Stopped",
            LofiStatus::Loading => "Loading...",
            LofiStatus::Playing => "Playing",
            LofiStatus::Paused => "Paused",
        }
    }
}

/// The player process and its control socket share one lifecycle.
#[derive(Debug)]
pub enum PlayerProcess {
    Idle,
    Running(PlayerHandle),
}

impl PlayerProcess {
    fn handle(&self) -> Option<&PlayerHandle> {
        match self {
            PlayerProcess::Idle => None,
            PlayerProcess::Running(h) => Some(h),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, PlayerProcess::Running(_))
    }
}

#[derive(Debug)]
pub struct LofiState {
    pub enabled: bool,
    pub url: String,
    pub status: LofiStatus,
    pub last_error: String,
    pub player: PlayerProcess,
    pub playlist: Vec<LofiTrack>,
    /// Selection in the playlist panel.
    pub cursor: usize,
    /// Track the player was last pointed at.
    pub now_playing: Option<usize>,
    /// Set when the URL changed and the playlist should be re-fetched after
    /// the modal closes.
    reload_pending: bool,
}

impl Default for LofiState {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            status: LofiStatus::Stopped,
            last_error: String::new(),
            player: PlayerProcess::Idle,
            playlist: Vec::new(),
            cursor: 0,
            now_playing: None,
            reload_pending: false,
        }
    }
}

impl LofiState {
    pub fn socket(&self) -> Option<&Path> {
        self.player.handle().map(|h| h.socket.as_path())
    }

    fn socket_owned(&self) -> Option<PathBuf> {
        self.socket().map(Path::to_path_buf)
    }

    /// Preconditions for anything that would touch the player.  The player
    /// binary itself is checked on the spawn path (`start_player`) — an
    /// already-running process is proof enough that it exists.
    fn validate(&self) -> Result<(), LofiError> {
        if !self.enabled {
            return Err(LofiError::Disabled);
        }
        if self.url.trim().is_empty() {
            return Err(LofiError::NoUrl);
        }
        Ok(())
    }

    fn validate_or_report(&mut self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(e) => {
                self.last_error = e.to_string();
                false
            }
        }
    }

    // ── settings transitions ──────────────────────────────────────────────────

    /// Toggle the feature.  Disabling tears the player down; enabling with a
    /// URL on file kicks off a playlist fetch.
    pub fn toggle_enabled(&mut self) -> Vec<Task> {
        self.enabled = !self.enabled;
        if !self.enabled {
            let tasks = self.teardown();
            self.last_error.clear();
            return tasks;
        }
        if !self.url.trim().is_empty() {
            return vec![Task::FetchPlaylist {
                url: self.url.clone(),
            }];
        }
        Vec::new()
    }

    /// Replace the playlist URL (from the settings form).  Returns the tasks
    /// the change requires right now; the fetch itself is deferred until
    /// `consume_reload` so a cancelled modal never reloads.
    pub fn set_url(&mut self, url: String) -> Vec<Task> {
        self.url = url;
        self.reload_pending = true;
        if self.player.is_running() && self.status != LofiStatus::Stopped {
            let socket = self.socket_owned().expect("running player has a socket");
            self.status = LofiStatus::Playing;
            return vec![Task::Control {
                socket,
                msg: ControlMsg::Load(self.url.clone()),
            }];
        }
        Vec::new()
    }

    /// Hand out the pending playlist reload, if any.
    pub fn consume_reload(&mut self) -> Vec<Task> {
        if !self.reload_pending {
            return Vec::new();
        }
        self.reload_pending = false;
        if self.url.trim().is_empty() {
            return Vec::new();
        }
        vec![Task::FetchPlaylist {
            url: self.url.clone(),
        }]
    }

    // ── playback transitions ──────────────────────────────────────────────────

    /// Start playback at a playlist index.
    pub fn play_at(&mut self, index: usize, events: &mpsc::Sender<AppEvent>) -> Vec<Task> {
        if !self.validate_or_report() {
            return Vec::new();
        }
        if index >= self.playlist.len() {
            self.last_error = "Select a track first.".to_string();
            return Vec::new();
        }
        self.now_playing = Some(index);
        self.cursor = index;

        let mut tasks = Vec::new();
        match &self.player {
            PlayerProcess::Idle => match self.start_player(events) {
                Some(t) => tasks.extend(t),
                None => return Vec::new(),
            },
            PlayerProcess::Running(handle) => {
                if self.status == LofiStatus::Stopped {
                    tasks.push(Task::Control {
                        socket: handle.socket.clone(),
                        msg: ControlMsg::Load(self.url.clone()),
                    });
                }
            }
        }

        self.status = LofiStatus::Loading;
        self.last_error.clear();
        let socket = self.socket_owned().expect("player just ensured");
        tasks.push(Task::DeferSeek {
            socket: socket.clone(),
            index,
        });
        tasks.push(Task::PollPlayback { socket, attempts: 0 });
        tasks
    }

    /// Space: pause/resume, bootstrapping playback when nothing runs yet.
    pub fn toggle_play_pause(&mut self, events: &mpsc::Sender<AppEvent>) -> Vec<Task> {
        if !self.validate_or_report() {
            return Vec::new();
        }
        if self.now_playing.is_none() && !self.playlist.is_empty() {
            let start = if self.cursor < self.playlist.len() {
                self.cursor
            } else {
                0
            };
            self.now_playing = Some(start);
        }

        match &self.player {
            PlayerProcess::Idle => {
                let mut tasks = match self.start_player(events) {
                    Some(t) => t,
                    None => return Vec::new(),
                };
                self.status = LofiStatus::Loading;
                self.last_error.clear();
                let socket = self.socket_owned().expect("player just started");
                if let Some(index) = self.now_playing {
                    tasks.push(Task::DeferSeek {
                        socket: socket.clone(),
                        index,
                    });
                }
                tasks.push(Task::PollPlayback { socket, attempts: 0 });
                tasks
            }
            PlayerProcess::Running(handle) => {
                let socket = handle.socket.clone();
                if self.status == LofiStatus::Stopped {
                    self.status = LofiStatus::Loading;
                    self.last_error.clear();
                    return vec![
                        Task::Control {
                            socket: socket.clone(),
                            msg: ControlMsg::Load(self.url.clone()),
                        },
                        Task::PollPlayback { socket, attempts: 0 },
                    ];
                }
                // Optimistic flip; a delivery failure surfaces later as
                // last_error without unwinding the flip.
                self.status = if self.status == LofiStatus::Paused {
                    LofiStatus::Playing
                } else {
                    LofiStatus::Paused
                };
                self.last_error.clear();
                vec![Task::Control {
                    socket,
                    msg: ControlMsg::TogglePause,
                }]
            }
        }
    }

    pub fn next(&mut self, events: &mpsc::Sender<AppEvent>) -> Vec<Task> {
        if let Some(tasks) = self.ensure_ready(events) {
            return tasks;
        }
        let mut tasks = vec![Task::Control {
            socket: self.socket_owned().expect("ready player"),
            msg: ControlMsg::Next,
        }];
        if !self.playlist.is_empty() {
            let current = self.now_playing.map(|n| n as i64).unwrap_or(-1);
            if current + 1 < self.playlist.len() as i64 {
                let next = (current + 1) as usize;
                self.now_playing = Some(next);
                self.cursor = next;
            }
        }
        tasks.extend(self.set_loading_and_poll());
        tasks
    }

    pub fn prev(&mut self, events: &mpsc::Sender<AppEvent>) -> Vec<Task> {
        if let Some(tasks) = self.ensure_ready(events) {
            return tasks;
        }
        let mut tasks = vec![Task::Control {
            socket: self.socket_owned().expect("ready player"),
            msg: ControlMsg::Prev,
        }];
        if let Some(now) = self.now_playing {
            if now > 0 {
                self.now_playing = Some(now - 1);
                self.cursor = now - 1;
            }
        }
        tasks.extend(self.set_loading_and_poll());
        tasks
    }

    /// Stop playback; the player stays alive, idle.
    pub fn stop(&mut self) -> Vec<Task> {
        match self.socket_owned() {
            None => {
                self.status = LofiStatus::Stopped;
                Vec::new()
            }
            Some(socket) => {
                self.status = LofiStatus::Stopped;
                self.last_error.clear();
                vec![Task::Control {
                    socket,
                    msg: ControlMsg::Stop,
                }]
            }
        }
    }

    /// Tear the player down: graceful quit, then force kill.  Used by
    /// disable; quit-time teardown goes through `Engine::shutdown`.
    pub fn teardown(&mut self) -> Vec<Task> {
        self.status = LofiStatus::Stopped;
        match std::mem::replace(&mut self.player, PlayerProcess::Idle) {
            PlayerProcess::Idle => Vec::new(),
            PlayerProcess::Running(handle) => {
                info!("lofi: tearing down player at {}", handle.socket.display());
                vec![Task::ShutdownPlayer { handle }]
            }
        }
    }

    // ── completion events ─────────────────────────────────────────────────────

    pub fn apply_playlist(&mut self, result: Result<Vec<LofiTrack>, String>) {
        match result {
            Err(e) => self.last_error = e,
            Ok(tracks) if tracks.is_empty() => {
                self.last_error = "No tracks found.".to_string();
            }
            Ok(tracks) => {
                self.playlist = tracks;
                self.last_error.clear();
                if self.cursor >= self.playlist.len() {
                    self.cursor = 0;
                }
                match self.now_playing {
                    Some(n) if n < self.playlist.len() => {}
                    _ => self.now_playing = Some(0),
                }
            }
        }
    }

    /// The deferred seek fired: point the player at the index and confirm.
    pub fn apply_seek(&mut self, socket: &Path, index: usize) -> Vec<Task> {
        if self.socket() != Some(socket) {
            return Vec::new(); // player torn down or replaced since
        }
        self.status = LofiStatus::Loading;
        self.last_error.clear();
        vec![
            Task::Control {
                socket: socket.to_path_buf(),
                msg: ControlMsg::PlayIndex(index),
            },
            Task::PollPlayback {
                socket: socket.to_path_buf(),
                attempts: 0,
            },
        ]
    }

    /// One poll attempt came back.
    pub fn apply_poll(
        &mut self,
        socket: &Path,
        playing: bool,
        attempts: u32,
        error: Option<String>,
        attempt_cap: u32,
    ) -> Vec<Task> {
        if self.socket() != Some(socket) {
            return Vec::new();
        }
        if let Some(err) = error {
            self.last_error = err;
            return Vec::new();
        }
        if playing {
            self.status = LofiStatus::Playing;
            self.last_error.clear();
            return Vec::new();
        }
        if self.status != LofiStatus::Loading {
            return Vec::new();
        }
        if attempts >= attempt_cap {
            // Give up quietly rather than poll forever; status stays as-is.
            warn!("lofi: playback unconfirmed after {} polls", attempts);
            return Vec::new();
        }
        vec![Task::PollPlayback {
            socket: socket.to_path_buf(),
            attempts: attempts + 1,
        }]
    }

    pub fn apply_control_sent(&mut self, socket: &Path, result: Result<(), String>) {
        if self.socket() != Some(socket) {
            return;
        }
        if let Err(e) = result {
            self.last_error = e;
        }
    }

    pub fn apply_exit(&mut self, socket: &Path, error: Option<String>) {
        match &self.player {
            PlayerProcess::Running(h) if h.socket.as_path() == socket => {
                self.player = PlayerProcess::Idle;
                self.status = LofiStatus::Stopped;
                self.last_error = match error {
                    Some(_) => "Lofi player stopped.".to_string(),
                    None => String::new(),
                };
            }
            // Exit of an already-torn-down or replaced process.
            _ => {}
        }
    }

    // ── internals ─────────────────────────────────────────────────────────────

    /// Spawn the player and queue the initial load.  `None` means the spawn
    /// was refused or failed and `last_error` explains why.
    fn start_player(&mut self, events: &mpsc::Sender<AppEvent>) -> Option<Vec<Task>> {
        // Fail fast before any process or socket action is attempted.
        if platform::find_mpv_binary().is_none() {
            self.last_error = LofiError::PlayerMissing.to_string();
            self.status = LofiStatus::Stopped;
            return None;
        }
        match player::spawn_player(events.clone()) {
            Ok(handle) => {
                let load = Task::Control {
                    socket: handle.socket.clone(),
                    msg: ControlMsg::Load(self.url.clone()),
                };
                self.player = PlayerProcess::Running(handle);
                Some(vec![load])
            }
            Err(e) => {
                warn!("lofi: failed to start player: {e}");
                self.last_error = format!("mpv error: {e}");
                self.status = LofiStatus::Stopped;
                None
            }
        }
    }

    /// Shared precheck for next/prev: `Some(tasks)` when the call was fully
    /// handled here (precondition failure or cold-start bootstrap).
    fn ensure_ready(&mut self, events: &mpsc::Sender<AppEvent>) -> Option<Vec<Task>> {
        if !self.validate_or_report() {
            return Some(Vec::new());
        }
        if self.player.is_running() {
            return None;
        }
        let mut tasks = match self.start_player(events) {
            Some(tasks) => tasks,
            None => return Some(Vec::new()),
        };
        self.status = LofiStatus::Loading;
        self.last_error.clear();
        tasks.push(Task::PollPlayback {
            socket: self.socket_owned().expect("player just started"),
            attempts: 0,
        });
        Some(tasks)
    }

    fn set_loading_and_poll(&mut self) -> Vec<Task> {
        self.status = LofiStatus::Loading;
        self.last_error.clear();
        match self.socket_owned() {
            Some(socket) => vec![Task::PollPlayback { socket, attempts: 0 }],
            None => Vec::new(),
        }
    }
}
