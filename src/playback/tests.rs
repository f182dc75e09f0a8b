//! Lifecycle tests against stand-in player binaries (`sleep` plays for a
//! controllable time and dies to SIGTERM, which is all the engine needs).

use std::collections::HashSet;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use super::*;
use crate::config::Settings;
use crate::library::Track;
use crate::status::{StatusHandle, new_status, read_status};

fn sleep_track(secs: &str) -> Track {
    // The player under test is `sleep`, so the "path" is the sleep length.
    Track::from_path(Path::new(secs), format!("sleep {secs}"))
}

fn engine_with(program: &str, status: &StatusHandle) -> PlayerEngine {
    let spec = PlayerSpec {
        program: program.into(),
        args: vec![],
        streams: false,
    };
    PlayerEngine::new(Some(spec), &Settings::default(), status.clone())
}

fn wait_for<F>(handle: &PlaybackHandle, timeout: Duration, what: &str, pred: F) -> PlaybackInfo
where
    F: Fn(&PlaybackInfo) -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        let info = handle.lock().unwrap().clone();
        if pred(&info) {
            return info;
        }
        if Instant::now() >= deadline {
            panic!("timed out waiting for {what}; last info: {info:?}");
        }
        thread::sleep(Duration::from_millis(10));
    }
}

fn wait_for_status(status: &StatusHandle, timeout: Duration, expected: &str) {
    let deadline = Instant::now() + timeout;
    loop {
        let s = read_status(status);
        if s.contains(expected) {
            return;
        }
        if Instant::now() >= deadline {
            panic!("timed out waiting for status {expected:?}; last: {s:?}");
        }
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn play_pause_resume_stop_lifecycle() {
    let status = new_status();
    let engine = engine_with("sleep", &status);
    let handle = engine.playback_handle();

    engine.send(PlayerCmd::PlayTrack(sleep_track("30"))).unwrap();
    wait_for(&handle, Duration::from_secs(5), "playing", |i| i.playing);

    engine.send(PlayerCmd::TogglePause).unwrap();
    let paused = wait_for(&handle, Duration::from_secs(5), "paused", |i| i.paused);

    // While paused, the estimate is frozen at the pause instant even though
    // the thread keeps republishing on every tick.
    thread::sleep(Duration::from_millis(500));
    let still = handle.lock().unwrap().clone();
    assert!(still.paused);
    assert_eq!(still.elapsed, paused.elapsed);

    engine.send(PlayerCmd::TogglePause).unwrap();
    wait_for(&handle, Duration::from_secs(5), "resumed", |i| !i.paused);

    engine.send(PlayerCmd::Stop).unwrap();
    let idle = wait_for(&handle, Duration::from_secs(5), "stopped", |i| !i.playing);
    assert!(idle.title.is_none());
    assert_eq!(idle.elapsed, Duration::ZERO);

    engine.shutdown();
}

#[test]
fn natural_exit_auto_advances_through_the_playlist() {
    let status = new_status();
    let engine = engine_with("sleep", &status);
    let handle = engine.playback_handle();

    let items = vec![sleep_track("0.2"), sleep_track("0.2"), sleep_track("0.2")];
    engine.send(PlayerCmd::SetPlaylist(items)).unwrap();
    engine.send(PlayerCmd::PlayPlaylist(0)).unwrap();

    let mut seen: HashSet<usize> = HashSet::new();
    let deadline = Instant::now() + Duration::from_secs(15);
    loop {
        let info = handle.lock().unwrap().clone();
        if info.playing {
            if let Some(pos) = info.playlist_pos {
                seen.insert(pos);
            }
        } else if seen.contains(&2) {
            break; // finished the last item and went idle
        }
        if Instant::now() >= deadline {
            panic!("auto-advance stalled; saw positions {seen:?}");
        }
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(seen, HashSet::from([0, 1, 2]));

    engine.shutdown();
}

#[test]
fn starting_a_new_track_replaces_the_old_one() {
    let status = new_status();
    let engine = engine_with("sleep", &status);
    let handle = engine.playback_handle();

    engine.send(PlayerCmd::PlayTrack(sleep_track("30"))).unwrap();
    wait_for(&handle, Duration::from_secs(5), "first track", |i| {
        i.title.as_deref() == Some("sleep 30")
    });

    engine.send(PlayerCmd::PlayTrack(sleep_track("31"))).unwrap();
    let info = wait_for(&handle, Duration::from_secs(5), "second track", |i| {
        i.title.as_deref() == Some("sleep 31")
    });
    assert!(info.playing);
    assert!(info.playlist_pos.is_none());

    engine.shutdown();
}

#[test]
fn playlist_boundaries_are_reported_noops() {
    let status = new_status();
    let engine = engine_with("sleep", &status);
    let handle = engine.playback_handle();

    engine
        .send(PlayerCmd::SetPlaylist(vec![sleep_track("30")]))
        .unwrap();
    engine.send(PlayerCmd::PlayPlaylist(0)).unwrap();
    wait_for(&handle, Duration::from_secs(5), "playing", |i| i.playing);

    engine.send(PlayerCmd::Prev).unwrap();
    wait_for_status(&status, Duration::from_secs(5), "Start of playlist.");
    let info = handle.lock().unwrap().clone();
    assert!(info.playing);
    assert_eq!(info.playlist_pos, Some(0));

    engine.send(PlayerCmd::Next).unwrap();
    wait_for_status(&status, Duration::from_secs(5), "End of playlist.");
    let info = handle.lock().unwrap().clone();
    assert!(info.playing);
    assert_eq!(info.playlist_pos, Some(0));

    engine.shutdown();
}

#[test]
fn skips_outside_playlist_context_are_rejected() {
    let status = new_status();
    let engine = engine_with("sleep", &status);
    let handle = engine.playback_handle();

    engine.send(PlayerCmd::Next).unwrap();
    wait_for_status(&status, Duration::from_secs(5), "Nothing playing.");

    engine.send(PlayerCmd::PlayTrack(sleep_track("30"))).unwrap();
    wait_for(&handle, Duration::from_secs(5), "playing", |i| i.playing);
    engine.send(PlayerCmd::Next).unwrap();
    wait_for_status(
        &status,
        Duration::from_secs(5),
        "Next/prev applies to playlist playback.",
    );

    engine.shutdown();
}

#[test]
fn pause_with_nothing_playing_is_reported() {
    let status = new_status();
    let engine = engine_with("sleep", &status);

    engine.send(PlayerCmd::TogglePause).unwrap();
    wait_for_status(&status, Duration::from_secs(5), "Nothing playing.");

    engine.shutdown();
}

#[test]
fn missing_player_binary_aborts_the_transition() {
    let status = new_status();
    let engine = engine_with("legato-no-such-binary", &status);
    let handle = engine.playback_handle();

    engine.send(PlayerCmd::PlayTrack(sleep_track("30"))).unwrap();
    wait_for_status(&status, Duration::from_secs(5), "Failed to play");
    assert!(!handle.lock().unwrap().playing);

    engine.shutdown();
}

#[test]
fn remote_track_needs_a_stream_capable_player() {
    let status = new_status();
    let engine = engine_with("sleep", &status); // streams: false
    let handle = engine.playback_handle();

    let remote = Track::from_remote(
        "Song".into(),
        "https://www.youtube.com/watch?v=abc".into(),
        "Mix".into(),
    );
    engine.send(PlayerCmd::PlayTrack(remote)).unwrap();
    wait_for_status(&status, Duration::from_secs(5), "Streaming playback requires mpv.");
    assert!(!handle.lock().unwrap().playing);

    engine.shutdown();
}
