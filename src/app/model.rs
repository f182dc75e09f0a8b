//! Application model: everything the UI renders and the key handlers edit.
//!
//! All of this state is owned by the interactive loop thread; background
//! workers only reach it through the shared status/playback/progress
//! handles.

use crate::download::ProgressHandle;
use crate::library::{Query, Track};
use crate::playback::PlaybackHandle;
use crate::playlist::Playlist;
use crate::status::{StatusHandle, set_status};

/// Upper bound on rendered search results, keeping redraws cheap for big
/// libraries.
pub const MAX_SHOW: usize = 400;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pane {
    Library,
    Playlist,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Editing the library search query (live).
    Search,
    /// Editing a remote playlist URL.
    RemoteUrl,
    /// Editing the download destination directory.
    DownloadDest,
}

pub struct App {
    pub tracks: Vec<Track>,
    /// Indices into `tracks` matching the current search query.
    matches: Vec<usize>,
    /// Cursor position within the (capped) match view.
    pub selected: usize,

    pub playlist: Playlist,
    pub playlist_selected: usize,
    /// Set when the playlist changed and the player's snapshot needs resync.
    pub playlist_dirty: bool,

    pub pane: Pane,
    pub input_mode: InputMode,
    /// Edit buffer for `RemoteUrl` / `DownloadDest` modes.
    pub input: String,
    pub search_query: String,

    pub status: StatusHandle,
    pub playback: Option<PlaybackHandle>,
    pub downloads: Option<ProgressHandle>,
    pub scan_root: Option<String>,
}

impl App {
    pub fn new(tracks: Vec<Track>, status: StatusHandle) -> Self {
        let matches = (0..tracks.len()).collect();
        Self {
            tracks,
            matches,
            selected: 0,
            playlist: Playlist::new(),
            playlist_selected: 0,
            playlist_dirty: true,
            pane: Pane::Library,
            input_mode: InputMode::Normal,
            input: String::new(),
            search_query: String::new(),
            status,
            playback: None,
            downloads: None,
            scan_root: None,
        }
    }

    pub fn report(&self, msg: impl Into<String>) {
        set_status(&self.status, msg);
    }

    pub fn set_playback_handle(&mut self, h: PlaybackHandle) {
        self.playback = Some(h);
    }

    pub fn set_download_handle(&mut self, h: ProgressHandle) {
        self.downloads = Some(h);
    }

    /// Replace the registry (rescan) and re-apply the current query.
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.apply_search();
    }

    /// Recompute `matches` for the current query and clamp the cursor.
    pub fn apply_search(&mut self) {
        let query = Query::new(&self.search_query);
        self.matches = (0..self.tracks.len())
            .filter(|&i| query.matches(&self.tracks[i]))
            .collect();
        self.clamp_selection();
    }

    /// The rendered slice of matches, capped at `MAX_SHOW`.
    pub fn view(&self) -> &[usize] {
        &self.matches[..self.matches.len().min(MAX_SHOW)]
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.view().get(self.selected).map(|&i| &self.tracks[i])
    }

    pub fn selected_playlist_index(&self) -> Option<usize> {
        (self.playlist_selected < self.playlist.len()).then_some(self.playlist_selected)
    }

    fn clamp_selection(&mut self) {
        let len = self.view().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
        let plen = self.playlist.len();
        if plen == 0 {
            self.playlist_selected = 0;
        } else if self.playlist_selected >= plen {
            self.playlist_selected = plen - 1;
        }
    }

    pub fn toggle_pane(&mut self) {
        self.pane = match self.pane {
            Pane::Library => Pane::Playlist,
            Pane::Playlist => Pane::Library,
        };
    }

    /// Move the focused pane's cursor down (no wrap).
    pub fn select_next(&mut self) {
        match self.pane {
            Pane::Library => {
                let len = self.view().len();
                if len > 0 && self.selected + 1 < len {
                    self.selected += 1;
                }
            }
            Pane::Playlist => {
                let len = self.playlist.len();
                if len > 0 && self.playlist_selected + 1 < len {
                    self.playlist_selected += 1;
                }
            }
        }
    }

    /// Move the focused pane's cursor up (no wrap).
    pub fn select_prev(&mut self) {
        match self.pane {
            Pane::Library => self.selected = self.selected.saturating_sub(1),
            Pane::Playlist => self.playlist_selected = self.playlist_selected.saturating_sub(1),
        }
    }

    pub fn add_selected_to_playlist(&mut self) {
        let Some(track) = self.selected_track().cloned() else {
            self.report("Add: nothing selected.");
            return;
        };
        self.playlist.push(track);
        self.playlist_dirty = true;
        self.report("Added to playlist.");
    }

    pub fn remove_selected_from_playlist(&mut self) {
        let Some(index) = self.selected_playlist_index() else {
            self.report("Remove: nothing selected.");
            return;
        };
        self.playlist.remove(index);
        self.playlist_dirty = true;
        self.clamp_selection();
        self.report("Removed from playlist.");
    }

    /// Install a freshly fetched remote playlist.
    pub fn replace_playlist(&mut self, tracks: Vec<Track>) {
        let count = tracks.len();
        self.playlist.replace(tracks);
        self.playlist_selected = 0;
        self.playlist_dirty = true;
        self.report(format!("Loaded {count} items."));
    }

    pub fn toggle_shuffle<R: rand::Rng>(&mut self, rng: &mut R) {
        if self.playlist.is_empty() {
            self.report("Shuffle: playlist empty.");
            return;
        }
        let on = self.playlist.toggle_shuffle(rng);
        self.playlist_dirty = true;
        self.report(if on { "Shuffle ON." } else { "Shuffle OFF." });
    }

    // --- input modes ---

    pub fn enter_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.pane = Pane::Library;
    }

    pub fn enter_remote_url(&mut self) {
        self.input_mode = InputMode::RemoteUrl;
        self.input.clear();
    }

    pub fn enter_download_dest(&mut self, default_dir: String) {
        self.input_mode = InputMode::DownloadDest;
        self.input = default_dir;
    }

    pub fn push_input(&mut self, c: char) {
        match self.input_mode {
            InputMode::Search => {
                self.search_query.push(c);
                self.apply_search();
            }
            InputMode::RemoteUrl | InputMode::DownloadDest => self.input.push(c),
            InputMode::Normal => {}
        }
    }

    pub fn pop_input(&mut self) {
        match self.input_mode {
            InputMode::Search => {
                self.search_query.pop();
                self.apply_search();
            }
            InputMode::RemoteUrl | InputMode::DownloadDest => {
                self.input.pop();
            }
            InputMode::Normal => {}
        }
    }

    /// Leave the current input mode, returning the committed buffer.
    pub fn take_input(&mut self) -> String {
        self.input_mode = InputMode::Normal;
        std::mem::take(&mut self.input)
    }

    /// Abandon the current input mode. Search additionally resets its query
    /// so Esc always returns to the full library.
    pub fn cancel_input(&mut self) {
        if self.input_mode == InputMode::Search {
            self.search_query.clear();
            self.apply_search();
        }
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }
}
