//! AppEvent — every input into the engine loop.
//!
//! Keystrokes, terminal resizes, and background-task completions all arrive
//! here, on one channel, in order.  Each background task delivers exactly one
//! completion variant; completions carry the control-socket path they were
//! issued against so the engine can discard results from a player that has
//! since been torn down or replaced.

use std::path::PathBuf;

use cram_core::model::LofiTrack;
use ratatui::crossterm::event::KeyEvent;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Playlist-fetch task finished.
    PlaylistLoaded(Result<Vec<LofiTrack>, String>),
    /// The post-start seek timer fired: jump to this playlist index.
    SeekDue { socket: PathBuf, index: usize },
    /// One playback-confirmation poll attempt finished.
    PlaybackPolled {
        socket: PathBuf,
        playing: bool,
        attempts: u32,
        error: Option<String>,
    },
    /// A one-shot control message was delivered (or failed to be).
    ControlSent {
        socket: PathBuf,
        result: Result<(), String>,
    },
    /// The player process exited, for any reason.
    PlayerExited {
        socket: PathBuf,
        error: Option<String>,
    },
}
