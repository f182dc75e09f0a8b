use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, InputMode, Pane};
use crate::config;
use crate::download::Downloader;
use crate::library::scan;
use crate::playback::{PlayerCmd, PlayerEngine};
use crate::remote::{self, FetchError, FetchedPlaylist};
use crate::ui;

/// Results posted back to the loop by one-shot background tasks. The loop
/// never waits on these; it drains whatever arrived since the last tick.
pub enum LoopEvent {
    PlaylistFetched(Result<FetchedPlaylist, FetchError>),
}

/// Main terminal event loop: handles input, UI drawing and sync with the
/// player and download workers. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    engine: &PlayerEngine,
    downloader: &Downloader,
    event_tx: &mpsc::Sender<LoopEvent>,
    event_rx: &mpsc::Receiver<LoopEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Keep the player thread's playlist snapshot in sync.
        sync_playlist(app, engine);

        while let Ok(ev) = event_rx.try_recv() {
            handle_loop_event(ev, app);
        }

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, engine, downloader, event_tx)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn sync_playlist(app: &mut App, engine: &PlayerEngine) {
    if app.playlist_dirty {
        let _ = engine.send(PlayerCmd::SetPlaylist(app.playlist.items().to_vec()));
        app.playlist_dirty = false;
    }
}

fn handle_loop_event(ev: LoopEvent, app: &mut App) {
    match ev {
        LoopEvent::PlaylistFetched(Ok(fetched)) => {
            if fetched.tracks.is_empty() {
                app.report("No playlist items found.");
            } else {
                let count = fetched.tracks.len();
                app.replace_playlist(fetched.tracks);
                app.report(format!("Loaded {count} items from {}.", fetched.title));
            }
        }
        LoopEvent::PlaylistFetched(Err(e)) => {
            app.report(format!("Failed to load playlist: {e}"));
        }
    }
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    engine: &PlayerEngine,
    downloader: &Downloader,
    event_tx: &mpsc::Sender<LoopEvent>,
) -> Result<bool, Box<dyn std::error::Error>> {
    if app.input_mode != InputMode::Normal {
        handle_input_mode_key(key, settings, app, downloader, event_tx);
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Tab => app.toggle_pane(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Enter => match app.pane {
            Pane::Library => {
                if let Some(track) = app.selected_track().cloned() {
                    let _ = engine.send(PlayerCmd::PlayTrack(track));
                }
            }
            Pane::Playlist => {
                if let Some(index) = app.selected_playlist_index() {
                    // The snapshot must reflect this playlist before the
                    // index is interpreted; channel order guarantees it.
                    sync_playlist(app, engine);
                    let _ = engine.send(PlayerCmd::PlayPlaylist(index));
                }
            }
        },
        KeyCode::Char(' ') => {
            let _ = engine.send(PlayerCmd::TogglePause);
        }
        KeyCode::Char('n') => {
            sync_playlist(app, engine);
            let _ = engine.send(PlayerCmd::Next);
        }
        KeyCode::Char('p') => {
            sync_playlist(app, engine);
            let _ = engine.send(PlayerCmd::Prev);
        }
        KeyCode::Char('s') => {
            let _ = engine.send(PlayerCmd::Stop);
        }
        KeyCode::Char('x') => app.toggle_shuffle(&mut rand::rng()),
        KeyCode::Char('+') => app.add_selected_to_playlist(),
        KeyCode::Char('-') => app.remove_selected_from_playlist(),
        KeyCode::Char('r') => {
            let root = app.scan_root.clone().unwrap_or_else(|| ".".to_string());
            app.set_tracks(scan(std::path::Path::new(&root), &settings.library));
            app.report("Rescanned local audio files.");
        }
        KeyCode::Char('/') => app.enter_search(),
        KeyCode::Char('u') => app.enter_remote_url(),
        KeyCode::Char('d') => {
            if downloader.running() {
                app.report("Download already running (press c to cancel).");
            } else if app.playlist.is_empty() {
                app.report("Playlist empty.");
            } else {
                app.enter_download_dest(default_download_dir());
            }
        }
        KeyCode::Char('c') => {
            if downloader.cancel() {
                app.report("Cancelling download…");
            } else {
                app.report("No download running.");
            }
        }
        _ => {}
    }

    Ok(false)
}

fn handle_input_mode_key(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    downloader: &Downloader,
    event_tx: &mpsc::Sender<LoopEvent>,
) {
    match key.code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Backspace => app.pop_input(),
        KeyCode::Enter => match app.input_mode {
            InputMode::Search => {
                // Keep the query; just leave the edit mode.
                app.input_mode = InputMode::Normal;
            }
            InputMode::RemoteUrl => {
                let url = app.take_input();
                if url.trim().is_empty() {
                    app.report("No URL given.");
                } else {
                    spawn_playlist_fetch(settings, url, event_tx.clone());
                    app.report("Loading playlist…");
                }
            }
            InputMode::DownloadDest => {
                let dest = app.take_input();
                start_batch(app, downloader, dest);
            }
            InputMode::Normal => {}
        },
        KeyCode::Char(c) if !c.is_control() => app.push_input(c),
        _ => {}
    }
}

/// Fetching a playlist can take many seconds; run it off the loop and post
/// the result back as a `LoopEvent`.
fn spawn_playlist_fetch(
    settings: &config::Settings,
    url: String,
    event_tx: mpsc::Sender<LoopEvent>,
) {
    let tool = settings.tools.downloader.clone();
    let timeout = Duration::from_secs(settings.remote.playlist_timeout_s);
    thread::spawn(move || {
        let result = remote::fetch_playlist(&tool, &url, timeout);
        let _ = event_tx.send(LoopEvent::PlaylistFetched(result));
    });
}

fn start_batch(app: &mut App, downloader: &Downloader, dest: String) {
    let dest = dest.trim();
    if dest.is_empty() {
        app.report("Download cancelled (empty path).");
        return;
    }

    let dest = expand_home(dest);
    if let Err(e) = std::fs::create_dir_all(&dest) {
        app.report(format!("Invalid folder: {e}"));
        return;
    }

    let items = app.playlist.items().to_vec();
    let total = items.len();
    if downloader.start(items, dest.clone()) {
        app.report(format!(
            "Downloading {total} items to: {} (press c to cancel)",
            dest.display()
        ));
    } else {
        app.report("Download already running (press c to cancel).");
    }
}

fn default_download_dir() -> String {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join("Music").display().to_string(),
        None => "Music".to_string(),
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
