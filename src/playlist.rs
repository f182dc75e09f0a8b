//! The user-curated playlist: an ordered track list plus the original-order
//! snapshot that makes shuffle reversible.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::library::Track;

#[derive(Default)]
pub struct Playlist {
    items: Vec<Track>,
    /// Pre-shuffle order, captured on the first shuffle toggle and kept
    /// until the playlist is rebuilt, so toggling off restores it exactly.
    original: Option<Vec<Track>>,
    shuffled: bool,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Track] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn shuffled(&self) -> bool {
        self.shuffled
    }

    /// Rebuild the playlist (a new remote load). Drops the snapshot: the
    /// next shuffle toggle captures the new order.
    pub fn replace(&mut self, items: Vec<Track>) {
        self.items = items;
        self.original = None;
        self.shuffled = false;
    }

    /// Append a track. An existing snapshot is kept in sync so a later
    /// un-shuffle can never drop the addition.
    pub fn push(&mut self, track: Track) {
        if let Some(orig) = self.original.as_mut() {
            orig.push(track.clone());
        }
        self.items.push(track);
    }

    /// Remove the track at `index`, mirroring the removal into the snapshot.
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        if index >= self.items.len() {
            return None;
        }
        let track = self.items.remove(index);
        if let Some(orig) = self.original.as_mut() {
            if let Some(pos) = orig.iter().position(|t| t.uri == track.uri) {
                orig.remove(pos);
            }
        }
        Some(track)
    }

    /// Toggle shuffle. On: capture the snapshot if none exists, then apply a
    /// uniform random permutation. Off: restore the snapshot exactly (and
    /// keep it for a later re-shuffle). Returns the new shuffle state.
    pub fn toggle_shuffle<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.shuffled {
            if let Some(orig) = self.original.as_ref() {
                self.items = orig.clone();
            }
            self.shuffled = false;
        } else {
            if self.original.is_none() {
                self.original = Some(self.items.clone());
            }
            self.items.shuffle(rng);
            self.shuffled = true;
        }
        self.shuffled
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::library::Track;

    fn t(name: &str) -> Track {
        Track::from_remote(name.into(), format!("https://example.com/{name}"), "test".into())
    }

    fn uris(p: &Playlist) -> Vec<String> {
        p.items().iter().map(|t| t.uri.clone()).collect()
    }

    #[test]
    fn shuffle_then_restore_recovers_exact_order() {
        for size in [0usize, 1, 2, 17] {
            let mut p = Playlist::new();
            p.replace((0..size).map(|i| t(&format!("t{i}"))).collect());
            let before = uris(&p);

            let mut rng = StdRng::seed_from_u64(7);
            assert!(p.toggle_shuffle(&mut rng));
            assert_eq!(p.len(), size);
            assert!(!p.toggle_shuffle(&mut rng));
            assert_eq!(uris(&p), before);
        }
    }

    #[test]
    fn shuffle_reorders_without_discarding() {
        let mut p = Playlist::new();
        p.replace((0..50).map(|i| t(&format!("t{i}"))).collect());
        let mut before = uris(&p);

        let mut rng = StdRng::seed_from_u64(1);
        p.toggle_shuffle(&mut rng);
        let mut after = uris(&p);

        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn snapshot_survives_for_a_reshuffle() {
        let mut p = Playlist::new();
        p.replace(vec![t("a"), t("b"), t("c"), t("d")]);
        let before = uris(&p);

        let mut rng = StdRng::seed_from_u64(3);
        p.toggle_shuffle(&mut rng);
        p.toggle_shuffle(&mut rng);
        p.toggle_shuffle(&mut rng); // re-shuffle from the same snapshot
        p.toggle_shuffle(&mut rng);
        assert_eq!(uris(&p), before);
    }

    #[test]
    fn replace_clears_snapshot() {
        let mut p = Playlist::new();
        p.replace(vec![t("a"), t("b")]);
        let mut rng = StdRng::seed_from_u64(5);
        p.toggle_shuffle(&mut rng);

        p.replace(vec![t("x"), t("y"), t("z")]);
        assert!(!p.shuffled());
        p.toggle_shuffle(&mut rng);
        p.toggle_shuffle(&mut rng);
        assert_eq!(uris(&p), vec!["https://example.com/x", "https://example.com/y", "https://example.com/z"]);
    }

    #[test]
    fn edits_while_shuffled_are_kept_after_restore() {
        let mut p = Playlist::new();
        p.replace(vec![t("a"), t("b"), t("c")]);
        let mut rng = StdRng::seed_from_u64(11);
        p.toggle_shuffle(&mut rng);

        p.push(t("d"));
        let removed = p.remove(0).unwrap();
        p.toggle_shuffle(&mut rng);

        let after = uris(&p);
        assert_eq!(after.len(), 3);
        assert!(after.contains(&"https://example.com/d".to_string()));
        assert!(!after.contains(&removed.uri));
    }

    #[test]
    fn remove_out_of_range_is_none() {
        let mut p = Playlist::new();
        assert!(p.remove(0).is_none());
    }
}
