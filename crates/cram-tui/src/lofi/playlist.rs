//! Playlist metadata loading via yt-dlp.
//!
//! yt-dlp is invoked with `--flat-playlist -J` and expected to print one JSON
//! document describing the playlist entries.  Only titles and an
//! uploader/channel note survive into the in-memory playlist.

use serde::Deserialize;
use tracing::info;

use cram_core::model::LofiTrack;
use cram_core::platform;

#[derive(Debug, Deserialize)]
struct PlaylistDoc {
    #[serde(default)]
    entries: Vec<PlaylistEntry>,
}

#[derive(Debug, Deserialize)]
struct PlaylistEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    uploader: String,
    #[serde(default)]
    channel: String,
}

/// Resolve the playlist behind `url` into track titles.
pub async fn fetch(url: &str) -> anyhow::Result<Vec<LofiTrack>> {
    let url = url.trim();
    if url.is_empty() {
        anyhow::bail!("set a playlist URL in Settings");
    }
    let binary = platform::find_yt_dlp_binary()
        .ok_or_else(|| anyhow::anyhow!("yt-dlp not found; install yt-dlp to load playlists"))?;

    info!("lofi: fetching playlist via {}", binary.display());
    let output = tokio::process::Command::new(&binary)
        .arg("--flat-playlist")
        .arg("-J")
        .arg(url)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("yt-dlp error: {}", stderr.trim());
    }

    parse_playlist(&output.stdout)
}

fn parse_playlist(raw: &[u8]) -> anyhow::Result<Vec<LofiTrack>> {
    let doc: PlaylistDoc =
        serde_json::from_slice(raw).map_err(|e| anyhow::anyhow!("yt-dlp parse error: {e}"))?;

    let tracks: Vec<LofiTrack> = doc
        .entries
        .into_iter()
        .filter_map(|entry| {
            let title = entry.title.trim().to_string();
            if title.is_empty() {
                return None;
            }
            let note = match entry.uploader.trim() {
                "" => entry.channel.trim().to_string(),
                uploader => uploader.to_string(),
            };
            Some(LofiTrack { title, note })
        })
        .collect();

    if tracks.is_empty() {
        anyhow::bail!("playlist is empty");
    }
    Ok(tracks)
}
