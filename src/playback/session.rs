//! The per-track playback session and its wall-clock progress estimate.
//!
//! The player process never reports its position, so elapsed time is pure
//! arithmetic over instants recorded here: time since start, minus time
//! spent suspended.

use std::time::{Duration, Instant};

use crate::library::Track;

use super::types::PlaySource;

pub(super) struct PlaybackSession {
    track: Track,
    source: PlaySource,
    playlist_pos: Option<usize>,
    duration: Option<Duration>,
    started_at: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl PlaybackSession {
    pub fn begin(
        track: Track,
        duration: Option<Duration>,
        source: PlaySource,
        playlist_pos: Option<usize>,
        now: Instant,
    ) -> Self {
        Self {
            track,
            source,
            playlist_pos,
            duration,
            started_at: now,
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn source(&self) -> PlaySource {
        self.source
    }

    pub fn playlist_pos(&self) -> Option<usize> {
        self.playlist_pos
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn pause(&mut self, now: Instant) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += now.saturating_duration_since(paused_at);
        }
    }

    /// Elapsed playback time at `now`: frozen at the pause instant while
    /// paused, clamped to zero either way.
    pub fn elapsed(&self, now: Instant) -> Duration {
        let end = self.paused_at.unwrap_or(now);
        end.saturating_duration_since(self.started_at)
            .saturating_sub(self.paused_total)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn session(at: Instant) -> PlaybackSession {
        let track = Track::from_path(Path::new("/tmp/a.mp3"), "a".into());
        PlaybackSession::begin(track, None, PlaySource::Library, None, at)
    }

    const S: Duration = Duration::from_secs(1);

    #[test]
    fn elapsed_tracks_wall_clock_while_playing() {
        let t0 = Instant::now();
        let s = session(t0);
        assert_eq!(s.elapsed(t0), Duration::ZERO);
        assert_eq!(s.elapsed(t0 + 2 * S), 2 * S);
        assert_eq!(s.elapsed(t0 + 90 * S), 90 * S);
    }

    #[test]
    fn elapsed_is_frozen_while_paused_and_excludes_pause_time() {
        let t0 = Instant::now();
        let mut s = session(t0);

        s.pause(t0 + 3 * S);
        assert_eq!(s.elapsed(t0 + 3 * S), 3 * S);
        assert_eq!(s.elapsed(t0 + 60 * S), 3 * S); // frozen

        s.resume(t0 + 10 * S);
        assert_eq!(s.elapsed(t0 + 10 * S), 3 * S);
        assert_eq!(s.elapsed(t0 + 12 * S), 5 * S);
    }

    #[test]
    fn elapsed_is_monotonic_across_pause_resume_cycles() {
        let t0 = Instant::now();
        let mut s = session(t0);

        let mut last = Duration::ZERO;
        let mut check = |s: &PlaybackSession, at: Instant| {
            let e = s.elapsed(at);
            assert!(e >= last, "elapsed went backwards: {e:?} < {last:?}");
            last = e;
        };

        check(&s, t0 + S);
        s.pause(t0 + 2 * S);
        check(&s, t0 + 2 * S);
        check(&s, t0 + 5 * S);
        s.resume(t0 + 6 * S);
        check(&s, t0 + 7 * S);
        s.pause(t0 + 8 * S);
        s.resume(t0 + 9 * S);
        check(&s, t0 + 10 * S);
    }

    #[test]
    fn elapsed_clamps_to_zero() {
        let t0 = Instant::now();
        let s = session(t0 + 5 * S);
        assert_eq!(s.elapsed(t0), Duration::ZERO);
    }

    #[test]
    fn double_pause_and_double_resume_are_harmless() {
        let t0 = Instant::now();
        let mut s = session(t0);
        s.pause(t0 + S);
        s.pause(t0 + 2 * S); // ignored, still paused at t0+1s
        assert_eq!(s.elapsed(t0 + 9 * S), S);
        s.resume(t0 + 5 * S);
        s.resume(t0 + 6 * S); // ignored
        assert_eq!(s.elapsed(t0 + 6 * S), 2 * S);
    }
}
