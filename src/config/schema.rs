use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/legato/config.toml` or
/// `~/.config/legato/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `LEGATO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub tools: ToolsSettings,
    pub playback: PlaybackSettings,
    pub remote: RemoteSettings,
    pub download: DownloadSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec![
                "mp3".into(),
                "m4a".into(),
                "opus".into(),
                "webm".into(),
                "flac".into(),
                "wav".into(),
                "ogg".into(),
                "aac".into(),
            ],
            follow_links: false,
            max_depth: None,
        }
    }
}

/// Names of the external tools. Every one of them can be overridden, which
/// is also what the test suite uses to stand in stub scripts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSettings {
    /// Player binary. When unset, mpv then ffplay are probed on PATH.
    pub player: Option<String>,
    /// Extra arguments passed to an overridden player before the target.
    pub player_args: Vec<String>,
    /// Extractor used for remote playlists, stream resolution and downloads.
    pub downloader: String,
    /// Transcoder used for local format conversion.
    pub transcoder: String,
    /// Duration prober for local files.
    pub prober: String,
}

impl Default for ToolsSettings {
    fn default() -> Self {
        Self {
            player: None,
            player_args: Vec::new(),
            downloader: "yt-dlp".into(),
            transcoder: "ffmpeg".into(),
            prober: "ffprobe".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Grace period between SIGTERM and SIGKILL when stopping (milliseconds).
    pub stop_grace_ms: u64,
    /// Upper bound on the duration probe (milliseconds).
    pub probe_timeout_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            stop_grace_ms: 800,
            probe_timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Upper bound on resolving one watch URL to a stream URL (seconds).
    pub resolve_timeout_s: u64,
    /// Upper bound on fetching a flat playlist document (seconds).
    pub playlist_timeout_s: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            resolve_timeout_s: 30,
            playlist_timeout_s: 25,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Target audio format (file extension and extractor `--audio-format`).
    pub audio_format: String,
    /// Extractor `--audio-quality` value ("0" = best).
    pub audio_quality: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            audio_format: "mp3".into(),
            audio_quality: "0".into(),
        }
    }
}
