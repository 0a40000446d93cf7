//! Snapshot persistence — a single JSON file, replaced atomically on save.
//!
//! The engine saves write-through: every committed mutation exports the full
//! snapshot and hands it here before control returns to the input loop.  A
//! failed save is reported to the caller and shown in the footer; the
//! in-memory state stays authoritative until the next successful save.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Project, Subject, TodoItem};

/// Everything that survives a restart.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Snapshot {
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub todos: Vec<TodoItem>,
    #[serde(default)]
    pub confirm_on: bool,
    #[serde(default)]
    pub week_start: String,
    #[serde(default)]
    pub week_span: i64,
    #[serde(default)]
    pub lofi_enabled: bool,
    #[serde(default)]
    pub lofi_url: String,
}

pub trait Store {
    /// `Ok(None)` when no snapshot exists yet (first run).
    fn load(&self) -> anyhow::Result<Option<Snapshot>>;
    fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()>;
}

pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonStore {
    fn load(&self) -> anyhow::Result<Option<Snapshot>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot = serde_json::from_str(&raw)?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut payload = serde_json::to_string_pretty(snapshot)?;
        payload.push('\n');

        // Write beside the target and rename so a crash mid-save never
        // leaves a truncated snapshot.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &self.path)?;
        debug!("snapshot saved to {}", self.path.display());
        Ok(())
    }
}
