use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::library::Track;
use crate::status::{new_status, read_status};

fn t(name: &str) -> Track {
    Track::from_path(Path::new(&format!("/music/{name}.mp3")), name.into())
}

fn app_with(names: &[&str]) -> App {
    App::new(names.iter().map(|n| t(n)).collect(), new_status())
}

#[test]
fn search_filters_by_substring_over_normalized_keys() {
    let mut app = app_with(&["Ed_Sheeran-Perfect", "Metallica-One", "Ed Sheeran Shape"]);

    app.enter_search();
    for c in "ed sheeran".chars() {
        app.push_input(c);
    }
    assert_eq!(app.view().len(), 2);

    app.pop_input(); // "ed sheera"
    assert_eq!(app.view().len(), 2);

    app.cancel_input();
    assert_eq!(app.view().len(), 3);
    assert!(app.search_query.is_empty());
}

#[test]
fn view_is_capped_at_max_show() {
    let names: Vec<String> = (0..500).map(|i| format!("track{i:04}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let app = app_with(&refs);
    assert_eq!(app.match_count(), 500);
    assert_eq!(app.view().len(), MAX_SHOW);
}

#[test]
fn selection_clamps_when_matches_shrink() {
    let mut app = app_with(&["aaa", "aab", "zzz"]);
    app.selected = 2;

    app.enter_search();
    app.push_input('a');
    // Only two matches remain; the cursor may not point past them.
    assert_eq!(app.view().len(), 2);
    assert!(app.selected < 2);
}

#[test]
fn add_and_remove_keep_playlist_cursor_valid() {
    let mut app = app_with(&["one", "two"]);

    app.add_selected_to_playlist();
    app.select_next();
    app.add_selected_to_playlist();
    assert_eq!(app.playlist.len(), 2);
    assert!(app.playlist_dirty);

    app.pane = Pane::Playlist;
    app.select_next();
    assert_eq!(app.playlist_selected, 1);
    app.remove_selected_from_playlist();
    assert_eq!(app.playlist.len(), 1);
    assert_eq!(app.playlist_selected, 0);

    app.remove_selected_from_playlist();
    assert!(app.playlist.is_empty());
    app.remove_selected_from_playlist();
    assert_eq!(read_status(&app.status), "Remove: nothing selected.");
}

#[test]
fn selection_movement_does_not_wrap() {
    let mut app = app_with(&["a", "b"]);
    app.select_prev();
    assert_eq!(app.selected, 0);
    app.select_next();
    app.select_next();
    app.select_next();
    assert_eq!(app.selected, 1);
}

#[test]
fn shuffle_on_empty_playlist_is_reported() {
    let mut app = app_with(&["a"]);
    let mut rng = StdRng::seed_from_u64(0);
    app.toggle_shuffle(&mut rng);
    assert_eq!(read_status(&app.status), "Shuffle: playlist empty.");
    assert!(!app.playlist.shuffled());
}

#[test]
fn shuffle_toggle_reports_and_marks_dirty() {
    let mut app = app_with(&["a", "b", "c"]);
    for _ in 0..3 {
        app.add_selected_to_playlist();
        app.select_next();
    }
    app.playlist_dirty = false;

    let mut rng = StdRng::seed_from_u64(0);
    app.toggle_shuffle(&mut rng);
    assert!(app.playlist.shuffled());
    assert!(app.playlist_dirty);
    assert_eq!(read_status(&app.status), "Shuffle ON.");

    app.toggle_shuffle(&mut rng);
    assert_eq!(read_status(&app.status), "Shuffle OFF.");
}

#[test]
fn replace_playlist_resets_cursor_and_reports_count() {
    let mut app = app_with(&[]);
    app.playlist_selected = 5;
    app.replace_playlist(vec![t("x"), t("y")]);
    assert_eq!(app.playlist_selected, 0);
    assert_eq!(app.playlist.len(), 2);
    assert_eq!(read_status(&app.status), "Loaded 2 items.");
}

#[test]
fn input_modes_edit_their_own_buffer() {
    let mut app = app_with(&["a"]);

    app.enter_remote_url();
    for c in "https://x".chars() {
        app.push_input(c);
    }
    assert_eq!(app.input, "https://x");
    assert!(app.search_query.is_empty());
    assert_eq!(app.take_input(), "https://x");
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.input.is_empty());

    app.enter_download_dest("/home/me/Music".into());
    app.pop_input();
    assert_eq!(app.input, "/home/me/Musi");
    app.cancel_input();
    assert!(app.input.is_empty());
}
