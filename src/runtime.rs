use std::env;
use std::path::Path;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::download::Downloader;
use crate::library::scan;
use crate::playback::{PlayerEngine, PlayerSpec};
use crate::status::{new_status, set_status};

mod event_loop;
mod settings;

pub use event_loop::LoopEvent;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    let dir = env::args().nth(1).unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| ".".to_string())
    });

    let status = new_status();
    let tracks = scan(Path::new(&dir), &settings.library);

    let spec = PlayerSpec::discover(&settings.tools);
    if spec.is_none() {
        set_status(
            &status,
            "No player found. Install mpv (recommended) or ffplay.",
        );
    }

    let engine = PlayerEngine::new(spec, &settings, status.clone());
    let downloader = Downloader::new(&settings, status.clone());

    let mut app = App::new(tracks, status);
    app.scan_root = Some(dir);
    app.set_playback_handle(engine.playback_handle());
    app.set_download_handle(downloader.progress_handle());

    // Results of off-loop work (playlist fetches) come back through here.
    let (event_tx, event_rx) = mpsc::channel::<LoopEvent>();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &engine,
        &downloader,
        &event_tx,
        &event_rx,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Bounded teardown: stop the player process and any in-flight download
    // tool before returning the terminal to the shell.
    engine.shutdown();
    downloader.shutdown();

    run_result
}
