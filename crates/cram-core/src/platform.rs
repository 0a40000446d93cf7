use std::path::PathBuf;

const APP_NAME: &str = "cram";

/// `~/.local/share/cram` — snapshot and log files.
pub fn data_dir() -> PathBuf {
    if let Ok(root) = std::env::var("XDG_DATA_HOME") {
        if !root.is_empty() {
            return PathBuf::from(root).join(APP_NAME);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".local")
        .join("share")
        .join(APP_NAME)
}

/// `~/.config/cram` — config.toml.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(APP_NAME)
}

/// A control-socket path no other cram session is using.  The player process
/// and this path share one lifecycle; a fresh name is chosen per spawn.
pub fn fresh_player_socket() -> PathBuf {
    let tag: u32 = rand::random();
    std::env::temp_dir().join(format!("cram-mpv-{tag:08x}.sock"))
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var("PATH").ok()?;
    for dir in path.split(':') {
        let candidate = PathBuf::from(dir).join(name);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

/// Find the mpv binary used for lofi playback.
pub fn find_mpv_binary() -> Option<PathBuf> {
    find_on_path("mpv")
}

/// Find the yt-dlp binary used to resolve playlist metadata.
pub fn find_yt_dlp_binary() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("YT_DLP_PATH") {
        let p = PathBuf::from(p);
        if p.exists() {
            return Some(p);
        }
    }
    find_on_path("yt-dlp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_sockets_do_not_collide() {
        let a = fresh_player_socket();
        let b = fresh_player_socket();
        assert_ne!(a, b);
        assert!(a.to_string_lossy().contains("cram-mpv-"));
    }
}
