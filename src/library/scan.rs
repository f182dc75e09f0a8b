use std::path::Path;

use lofty::{ItemKey, TaggedFileExt};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

/// Build the display title for a local file: tagged "Artist - Title" when the
/// tags are readable, the file stem otherwise.
fn display_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();

    let Ok(tagged) = lofty::read_from_path(path) else {
        return stem;
    };
    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        return stem;
    };

    let title = tag
        .get_string(&ItemKey::TrackTitle)
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let artist = tag
        .get_string(&ItemKey::TrackArtist)
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match (artist, title) {
        (Some(a), Some(t)) => format!("{} - {}", a, t),
        (None, Some(t)) => t.to_string(),
        _ => stem,
    }
}

/// Recursively enumerate audio files under `dir`, sorted by parent directory
/// then file name, case-insensitively. Unreadable entries are skipped.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);
    if let Some(d) = settings.max_depth {
        walker = walker.max_depth(d);
    }

    let mut tracks: Vec<Track> = Vec::new();
    for entry in walker.into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if path.is_file() && is_audio_file(path, settings) {
            tracks.push(Track::from_path(path, display_for(path)));
        }
    }

    tracks.sort_by(|a, b| {
        (a.context.to_lowercase(), a.display.to_lowercase())
            .cmp(&(b.context.to_lowercase(), b.display.to_lowercase()))
    });
    tracks
}
