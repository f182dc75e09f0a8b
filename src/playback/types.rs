//! Playback-related small types and handles.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::ToolsSettings;
use crate::process::which;

/// Which list the playing track came from. Next/prev and auto-advance are
/// defined only for the playlist context.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaySource {
    /// Started directly from the registry / search results.
    Library,
    /// Started from the playlist at a captured index.
    Playlist,
}

#[derive(Debug)]
pub enum PlayerCmd {
    /// Play one track ad hoc (registry context).
    PlayTrack(crate::library::Track),
    /// Play the playlist snapshot entry at the given index.
    PlayPlaylist(usize),
    /// Replace the player's playlist snapshot.
    SetPlaylist(Vec<crate::library::Track>),
    /// Suspend or continue the player process group.
    TogglePause,
    /// Stop playback and reset the session.
    Stop,
    /// Skip to the next playlist entry.
    Next,
    /// Go back to the previous playlist entry.
    Prev,
    /// Stop playback and end the player thread.
    Quit,
}

/// Runtime playback information shared with the UI.
#[derive(Debug, Clone, Default)]
pub struct PlaybackInfo {
    /// Display title of the playing track (if any).
    pub title: Option<String>,
    /// Whether a supervised player process exists.
    pub playing: bool,
    /// Whether that process group is currently suspended.
    pub paused: bool,
    /// Estimated elapsed playback time (wall clock minus pauses).
    pub elapsed: Duration,
    /// Track duration when the probe knew it; `None` renders as an
    /// indeterminate sweep.
    pub duration: Option<Duration>,
    /// Playlist index captured at start time, for playlist-context playback.
    pub playlist_pos: Option<usize>,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

/// The resolved player invocation.
#[derive(Debug, Clone)]
pub struct PlayerSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Whether the player can be handed an HTTP stream URL (mpv can,
    /// ffplay's autoexit setup is only reliable for files).
    pub streams: bool,
}

impl PlayerSpec {
    /// Pick a player: the configured override first, then mpv, then ffplay.
    pub fn discover(tools: &ToolsSettings) -> Option<Self> {
        if let Some(program) = &tools.player {
            return Some(Self {
                program: program.clone(),
                args: tools.player_args.clone(),
                streams: program.contains("mpv"),
            });
        }
        if which("mpv").is_some() {
            return Some(Self {
                program: "mpv".into(),
                args: vec![
                    "--no-video".into(),
                    "--quiet".into(),
                    "--audio-display=no".into(),
                ],
                streams: true,
            });
        }
        if which("ffplay").is_some() {
            return Some(Self {
                program: "ffplay".into(),
                args: vec![
                    "-nodisp".into(),
                    "-autoexit".into(),
                    "-loglevel".into(),
                    "quiet".into(),
                ],
                streams: false,
            });
        }
        None
    }
}
