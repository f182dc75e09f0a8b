//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::{Duration, Instant};

use crate::app::{App, InputMode, Pane};
use crate::download::{BatchOutcome, DownloadProgress};
use crate::playback::PlaybackInfo;
use crate::status::read_status;

const CONTROLS: &str = "[enter] play | [space] pause | [n/p] next/prev | [s] stop | [x] shuffle | \
[+/-] add/remove | [/] search | [u] playlist url | [d] download | [c] cancel dl | [r] rescan | \
[tab] pane | [q] quit";

/// Format a `Duration` as `MM:SS`, with the unknown marker for `None`.
fn format_mmss(d: Option<Duration>) -> String {
    match d {
        Some(d) => {
            let secs = d.as_secs();
            format!("{:02}:{:02}", secs / 60, secs % 60)
        }
        None => "??:??".to_string(),
    }
}

/// Determinate progress bar: filled blocks proportional to elapsed/total.
fn bar_determinate(elapsed: Duration, total: Duration, width: usize) -> String {
    let pct = if total.as_secs_f64() > 0.0 {
        (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (pct * width as f64) as usize;
    let mut bar = "█".repeat(filled.min(width));
    bar.push_str(&"░".repeat(width - filled.min(width)));
    bar
}

/// Indeterminate bar: a block sweeping across the width, driven by wall
/// clock so it animates between redraws without extra state.
fn bar_indeterminate(t: Duration, width: usize, speed: f64) -> String {
    let width = width.max(1);
    let block = (width / 6).max(6);
    let span = (width + block) as i64;
    let pos = ((t.as_secs_f64() * speed) as i64 % span.max(1)) - block as i64;

    (0..width as i64)
        .map(|i| if i >= pos && i < pos + block as i64 { '█' } else { '░' })
        .collect()
}

/// Render the entire UI into the provided `frame` using `app` state.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0]);
    draw_lists(frame, app, chunks[1]);
    draw_progress(frame, app, chunks[2]);
    draw_downloads(frame, app, chunks[3]);
    draw_status(frame, app, chunks[4]);

    let footer = Paragraph::new(CONTROLS)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}

fn draw_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new(" ~ legato: your library, your playlists ~ ")
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" legato ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, area);
}

fn draw_lists(frame: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    // Library pane: the (capped) search view.
    {
        let view = app.view();
        let title = format!(" tracks ({}/{}) ", app.match_count(), app.tracks.len());
        let (start, end, highlight) = window(view.len(), app.selected, halves[0].height);

        let items: Vec<ListItem> = view[start..end]
            .iter()
            .map(|&i| {
                let t = &app.tracks[i];
                ListItem::new(format!("{}  ({})", t.display, t.context))
            })
            .collect();
        let list = List::new(items)
            .block(pane_block(&title, app.pane == Pane::Library))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if end > start {
            state.select(Some(highlight));
        }
        frame.render_stateful_widget(list, halves[0], &mut state);
    }

    // Playlist pane, with ordinals matching the download naming.
    {
        let items_src = app.playlist.items();
        let mut title = format!(" playlist ({}) ", items_src.len());
        if app.playlist.shuffled() {
            title = format!(" playlist ({}) SHUFFLE ", items_src.len());
        }
        let (start, end, highlight) = window(items_src.len(), app.playlist_selected, halves[1].height);

        let items: Vec<ListItem> = if items_src.is_empty() {
            vec![ListItem::new("Playlist empty. Press + to add the selected track.")]
        } else {
            items_src[start..end]
                .iter()
                .enumerate()
                .map(|(offset, t)| ListItem::new(format!("{:>3}. {}", start + offset + 1, t.display)))
                .collect()
        };
        let list = List::new(items)
            .block(pane_block(&title, app.pane == Pane::Playlist))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if end > start {
            state.select(Some(highlight));
        }
        frame.render_stateful_widget(list, halves[1], &mut state);
    }
}

fn pane_block(title: &str, focused: bool) -> Block<'static> {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    if focused {
        block.border_style(Style::default().add_modifier(Modifier::BOLD))
    } else {
        block
    }
}

/// Window `len` rows around `selected` into a pane `height` rows tall
/// (minus borders), returning (start, end, highlight-within-window).
fn window(len: usize, selected: usize, height: u16) -> (usize, usize, usize) {
    let rows = height.saturating_sub(2) as usize;
    if len <= rows || rows == 0 {
        return (0, len, selected.min(len.saturating_sub(1)));
    }
    let half = rows / 2;
    let mut start = selected.saturating_sub(half);
    if start + rows > len {
        start = len - rows;
    }
    (start, start + rows, selected - start)
}

fn draw_progress(frame: &mut Frame, app: &App, area: Rect) {
    let info: PlaybackInfo = app
        .playback
        .as_ref()
        .and_then(|h| h.lock().ok().map(|i| i.clone()))
        .unwrap_or_default();

    let bar_width = area.width.saturating_sub(16).max(16) as usize;
    let text = if info.playing {
        let state = if info.paused { "PAUSED" } else { "PLAYING" };
        let shuffle = if app.playlist.shuffled() { "  SHUFFLE" } else { "" };
        let title = info.title.as_deref().unwrap_or("-");
        let bar = match info.duration {
            Some(total) => bar_determinate(info.elapsed, total, bar_width),
            // No known duration (remote stream): sweep instead of percent.
            None => bar_indeterminate(info.elapsed, bar_width, 6.0),
        };
        format!(
            "{state}{shuffle}  {title}\n{} [{bar}] {}",
            format_mmss(Some(info.elapsed)),
            format_mmss(info.duration),
        )
    } else {
        format!("STOPPED  Nothing playing\n{} [{}] {}",
            format_mmss(Some(Duration::ZERO)),
            "░".repeat(bar_width),
            format_mmss(None),
        )
    };

    let progress = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" now playing ")
            .padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            }),
    );
    frame.render_widget(progress, area);
}

fn draw_downloads(frame: &mut Frame, app: &App, area: Rect) {
    let progress: DownloadProgress = app
        .downloads
        .as_ref()
        .and_then(|h| h.lock().ok().map(|p| p.clone()))
        .unwrap_or_default();

    let text = if progress.active {
        let bar_width = area.width.saturating_sub(6).max(24) as usize;
        let t = progress
            .started_at
            .map(|s| Instant::now().saturating_duration_since(s))
            .unwrap_or_default();
        format!(
            "DOWNLOADING  {}/{}  (press c to cancel)  {}\n[{}]",
            progress.current,
            progress.total,
            progress.title,
            bar_indeterminate(t, bar_width, 8.0),
        )
    } else {
        match &progress.outcome {
            Some(BatchOutcome::Completed) => {
                format!("Last batch: {} item(s) downloaded.", progress.total)
            }
            Some(BatchOutcome::Cancelled) => "Last batch cancelled.".to_string(),
            Some(BatchOutcome::CompletedWithErrors(failures)) => format!(
                "Last batch: {} error(s), first: #{} {} ({})",
                failures.len(),
                failures[0].index,
                failures[0].title,
                failures[0].reason,
            ),
            None => "No download running. Press d to download the playlist.".to_string(),
        }
    };

    let panel = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" downloads ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(panel, area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    // While an input mode is active the status line doubles as the prompt.
    let line = match app.input_mode {
        InputMode::Search => format!("Search: {}█  (Enter keeps, Esc clears)", app.search_query),
        InputMode::RemoteUrl => format!("Playlist URL: {}█  (Enter loads, Esc cancels)", app.input),
        InputMode::DownloadDest => {
            format!("Download to: {}█  (Enter starts, Esc cancels)", app.input)
        }
        InputMode::Normal => {
            let mut parts = vec![read_status(&app.status)];
            if !app.search_query.is_empty() {
                parts.push(format!("FILTER: {}", app.search_query));
            }
            if let Some(root) = &app.scan_root {
                parts.push(format!("Dir: {root}"));
            }
            parts.join(" • ")
        }
    };

    let status = Paragraph::new(line)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, area);
}
