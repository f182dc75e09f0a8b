use std::path::{Path, PathBuf};

use super::search::{normalize_for_search, squash_spaces};

/// Where a track's audio comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// A file on disk; `uri` is its path.
    Local,
    /// A remote item; `uri` is a canonical watch URL that still needs
    /// resolving to a direct stream before playback.
    Remote,
}

/// One playable item. Immutable after construction and cheap to clone, so
/// the registry, the playlist and the worker threads can all hold copies.
#[derive(Clone, Debug)]
pub struct Track {
    pub source: Source,
    pub uri: String,
    /// Human title shown in lists and used for download file names.
    pub display: String,
    /// Secondary label: parent directory for local files, playlist title
    /// for remote items.
    pub context: String,

    // Search keys, precomputed once so filtering never re-normalizes.
    pub(super) norm_display: String,
    pub(super) norm_context: String,
    pub(super) squashed_display: String,
    pub(super) squashed_context: String,
}

impl Track {
    pub fn from_path(path: &Path, display: String) -> Self {
        let context = path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Self::build(Source::Local, path.display().to_string(), display, context)
    }

    pub fn from_remote(title: String, watch_url: String, playlist_title: String) -> Self {
        Self::build(Source::Remote, watch_url, title, playlist_title)
    }

    fn build(source: Source, uri: String, display: String, context: String) -> Self {
        let norm_display = normalize_for_search(&display);
        let norm_context = normalize_for_search(&context);
        let squashed_display = squash_spaces(&norm_display);
        let squashed_context = squash_spaces(&norm_context);
        Self {
            source,
            uri,
            display,
            context,
            norm_display,
            norm_context,
            squashed_display,
            squashed_context,
        }
    }

    pub fn is_local(&self) -> bool {
        self.source == Source::Local
    }

    /// The on-disk path for local tracks.
    pub fn path(&self) -> Option<PathBuf> {
        self.is_local().then(|| PathBuf::from(&self.uri))
    }
}
