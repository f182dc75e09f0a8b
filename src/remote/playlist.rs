use std::io;
use std::process::Command;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::library::Track;
use crate::process::run_captured;

use super::url::normalize_watch_url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("`{0}` not found (is it installed?)")]
    ToolMissing(String),
    #[error("playlist fetch timed out")]
    Timeout,
    #[error("failed to run `{tool}`: {source}")]
    Invocation {
        tool: String,
        source: io::Error,
    },
    #[error("playlist fetch failed: {0}")]
    Failed(String),
    #[error("unreadable playlist document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The slice of the extractor's `--flat-playlist -J` document we care about.
#[derive(Debug, Deserialize)]
struct FlatPlaylist {
    title: Option<String>,
    /// Unavailable videos show up as `null` entries; keep them as `None`.
    #[serde(default)]
    entries: Vec<Option<FlatEntry>>,
}

#[derive(Debug, Deserialize)]
struct FlatEntry {
    id: Option<String>,
    title: Option<String>,
    url: Option<String>,
    webpage_url: Option<String>,
}

impl FlatEntry {
    /// Recover a playable watch URL from whichever field the extractor
    /// filled in: full page URL, absolute URL, site-relative `watch?` path
    /// or a bare video id.
    fn watch_url(&self) -> Option<String> {
        if let Some(w) = self.webpage_url.as_deref() {
            let w = w.trim();
            if !w.is_empty() {
                return Some(normalize_watch_url(w));
            }
        }

        let u = self
            .url
            .as_deref()
            .or(self.id.as_deref())
            .map(str::trim)
            .filter(|u| !u.is_empty())?;

        if u.starts_with("http://") || u.starts_with("https://") {
            return Some(normalize_watch_url(u));
        }
        if let Some(stripped) = u.strip_prefix('/') {
            if stripped.starts_with("watch?") {
                return Some(normalize_watch_url(&format!(
                    "https://www.youtube.com/{stripped}"
                )));
            }
        }
        if u.starts_with("watch?") {
            return Some(normalize_watch_url(&format!("https://www.youtube.com/{u}")));
        }
        Some(normalize_watch_url(&format!(
            "https://www.youtube.com/watch?v={u}"
        )))
    }
}

#[derive(Debug)]
pub struct FetchedPlaylist {
    pub title: String,
    pub tracks: Vec<Track>,
}

/// Fetch a remote playlist as flat metadata (no media) and turn each entry
/// into a remote `Track`. Entries without a recoverable watch URL are
/// dropped rather than failing the whole fetch.
pub fn fetch_playlist(
    downloader: &str,
    url: &str,
    timeout: Duration,
) -> Result<FetchedPlaylist, FetchError> {
    let url = normalize_watch_url(url);

    let mut cmd = Command::new(downloader);
    cmd.args(["--flat-playlist", "-J", "--no-warnings"]).arg(&url);

    let out = run_captured(cmd, timeout).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => FetchError::ToolMissing(downloader.to_string()),
        io::ErrorKind::TimedOut => FetchError::Timeout,
        _ => FetchError::Invocation {
            tool: downloader.to_string(),
            source: e,
        },
    })?;

    if !out.status.success() {
        return Err(FetchError::Failed(diagnostic_tail(&out.stderr)));
    }

    let doc: FlatPlaylist = serde_json::from_slice(&out.stdout)?;
    let title = doc
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Remote".to_string());

    let tracks = doc
        .entries
        .into_iter()
        .flatten()
        .filter_map(|e| {
            let watch_url = e.watch_url()?;
            let entry_title = e
                .title
                .or(e.id)
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string());
            Some(Track::from_remote(entry_title, watch_url, title.clone()))
        })
        .collect();

    Ok(FetchedPlaylist { title, tracks })
}

/// Keep diagnostics bounded: the last chunk of the tool's stderr.
pub(super) fn diagnostic_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.is_empty() {
        return "tool reported no detail".to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    if chars.len() > 1000 {
        chars[chars.len() - 1000..].iter().collect()
    } else {
        text.to_string()
    }
}
