use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::Settings;
use crate::library::{Source, Track};
use crate::process::{GroupChild, Liveness};
use crate::remote;
use crate::status::{StatusHandle, set_status};

use super::probe;
use super::session::PlaybackSession;
use super::types::{PlaySource, PlaybackHandle, PlaybackInfo, PlayerCmd, PlayerSpec};

/// Command-poll cadence; the timeout arm doubles as the exit-detection tick.
const TICK: Duration = Duration::from_millis(200);

pub(super) fn spawn_player_thread(
    spec: Option<PlayerSpec>,
    settings: &Settings,
    rx: Receiver<PlayerCmd>,
    info: PlaybackHandle,
    status: StatusHandle,
) -> JoinHandle<()> {
    let mut player = Player {
        spec,
        settings: settings.clone(),
        playlist: Vec::new(),
        child: None,
        session: None,
        info,
        status,
    };

    thread::spawn(move || {
        loop {
            match rx.recv_timeout(TICK) {
                Ok(PlayerCmd::PlayTrack(track)) => {
                    player.start_track(track, PlaySource::Library, None);
                }
                Ok(PlayerCmd::PlayPlaylist(index)) => match player.playlist.get(index) {
                    Some(track) => {
                        player.start_track(track.clone(), PlaySource::Playlist, Some(index));
                    }
                    None => player.report("Playlist entry no longer exists."),
                },
                Ok(PlayerCmd::SetPlaylist(items)) => {
                    // Replacing the snapshot never touches the session: the
                    // captured index keeps meaning "the playlist as it was
                    // when this track started".
                    player.playlist = items;
                }
                Ok(PlayerCmd::TogglePause) => player.toggle_pause(),
                Ok(PlayerCmd::Stop) => {
                    player.stop_current();
                    player.report("Stopped playback.");
                }
                Ok(PlayerCmd::Next) => player.skip(1),
                Ok(PlayerCmd::Prev) => player.skip(-1),
                Ok(PlayerCmd::Quit) => {
                    player.stop_current();
                    break;
                }
                Err(RecvTimeoutError::Timeout) => player.tick(),
                Err(RecvTimeoutError::Disconnected) => {
                    player.stop_current();
                    break;
                }
            }
        }
    })
}

struct Player {
    spec: Option<PlayerSpec>,
    settings: Settings,
    /// The playlist as last synced from the UI; session indices point into
    /// the snapshot that was current when the track started.
    playlist: Vec<Track>,
    child: Option<GroupChild>,
    session: Option<PlaybackSession>,
    info: PlaybackHandle,
    status: StatusHandle,
}

impl Player {
    fn report(&self, msg: impl Into<String>) {
        set_status(&self.status, msg);
    }

    fn publish(&self) {
        let Ok(mut info) = self.info.lock() else {
            return;
        };
        match &self.session {
            Some(s) => {
                info.title = Some(s.track().display.clone());
                info.playing = true;
                info.paused = s.paused();
                info.elapsed = s.elapsed(Instant::now());
                info.duration = s.duration();
                info.playlist_pos = match s.source() {
                    PlaySource::Playlist => s.playlist_pos(),
                    PlaySource::Library => None,
                };
            }
            None => *info = PlaybackInfo::default(),
        }
    }

    fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.settings.playback.stop_grace_ms)
    }

    /// Fully stop the current player process (graceful, then forceful) and
    /// reset the session. Always runs before a new track starts, so two
    /// player processes never overlap.
    fn stop_current(&mut self) {
        if let Some(child) = self.child.take() {
            child.shutdown(self.stop_grace());
        }
        self.session = None;
        self.publish();
    }

    fn start_track(&mut self, track: Track, source: PlaySource, playlist_pos: Option<usize>) {
        self.stop_current();

        let Some(spec) = self.spec.clone() else {
            self.report("No player found. Install mpv (recommended) or ffplay.");
            return;
        };
        if track.source == Source::Remote && !spec.streams {
            self.report("Streaming playback requires mpv.");
            return;
        }

        let target = match track.source {
            Source::Local => track.uri.clone(),
            Source::Remote => {
                self.report("Resolving stream…");
                let timeout = Duration::from_secs(self.settings.remote.resolve_timeout_s);
                match remote::resolve_stream(&self.settings.tools.downloader, &track.uri, timeout) {
                    Ok(stream_url) => stream_url,
                    Err(e) => {
                        self.report(format!("Failed to play: {e}"));
                        return;
                    }
                }
            }
        };

        let mut args = spec.args.clone();
        args.push(target);
        let child = match GroupChild::spawn(&spec.program, &args) {
            Ok(child) => child,
            Err(e) => {
                self.report(format!("Failed to play: {e}"));
                return;
            }
        };

        let duration = track.path().and_then(|path| {
            probe::duration_of(
                &self.settings.tools.prober,
                &path,
                Duration::from_millis(self.settings.playback.probe_timeout_ms),
            )
        });

        self.child = Some(child);
        self.session = Some(PlaybackSession::begin(
            track,
            duration,
            source,
            playlist_pos,
            Instant::now(),
        ));
        self.report("Playing.");
        self.publish();
    }

    fn toggle_pause(&mut self) {
        let now = Instant::now();
        let msg = match (self.child.as_ref(), self.session.as_mut()) {
            (Some(child), Some(session)) => {
                if session.paused() {
                    match child.resume() {
                        Ok(()) => {
                            session.resume(now);
                            "Resumed.".to_string()
                        }
                        Err(e) => format!("Pause/resume failed: {e}"),
                    }
                } else {
                    match child.suspend() {
                        Ok(()) => {
                            session.pause(now);
                            "Paused. (Space resumes)".to_string()
                        }
                        Err(e) => format!("Pause/resume failed: {e}"),
                    }
                }
            }
            _ => "Nothing playing.".to_string(),
        };
        self.report(msg);
        self.publish();
    }

    /// Manual next/prev. Only meaningful in playlist context; boundary hits
    /// are reported no-ops.
    fn skip(&mut self, direction: i64) {
        let Some(session) = self.session.as_ref() else {
            self.report("Nothing playing.");
            return;
        };
        let pos = match (session.source(), session.playlist_pos()) {
            (PlaySource::Playlist, Some(pos)) => pos,
            _ => {
                self.report("Next/prev applies to playlist playback.");
                return;
            }
        };

        let target = pos as i64 + direction;
        if target < 0 {
            self.report("Start of playlist.");
            return;
        }
        let target = target as usize;
        let Some(track) = self.playlist.get(target).cloned() else {
            self.report("End of playlist.");
            return;
        };
        self.start_track(track, PlaySource::Playlist, Some(target));
    }

    /// Periodic tick: detect the player exiting on its own and either
    /// auto-advance (playlist context with a next entry) or go idle.
    fn tick(&mut self) {
        let exited = match self.child.as_mut() {
            Some(child) => matches!(child.poll(), Liveness::Exited(_)),
            None => false,
        };

        if exited {
            self.child = None;
            let next = self.session.as_ref().and_then(|s| match s.source() {
                PlaySource::Playlist => s
                    .playlist_pos()
                    .map(|pos| pos + 1)
                    .filter(|&next| next < self.playlist.len()),
                PlaySource::Library => None,
            });
            self.session = None;

            match next {
                Some(index) => {
                    let track = self.playlist[index].clone();
                    self.start_track(track, PlaySource::Playlist, Some(index));
                }
                None => self.publish(),
            }
            return;
        }

        // Refresh the elapsed estimate for the UI.
        if self.session.is_some() {
            self.publish();
        }
    }
}
