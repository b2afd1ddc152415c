//! Chunk map for one streamed layer
//!
//! Holds exactly one entry per coordinate. Owned and mutated only by the
//! control thread.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::chunk::ChunkCoord;
use crate::streaming::chunk::{Chunk, ChunkState, FadeStep};

/// Number of chunks in each lifecycle state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub pending: usize,
    pub fading_in: usize,
    pub active: usize,
    pub fading_out: usize,
    /// Pending chunks whose generation failed
    pub failed: usize,
}

impl StateCounts {
    pub fn total(&self) -> usize {
        self.pending + self.fading_in + self.active + self.fading_out
    }
}

/// Map of chunk coordinates to chunks
#[derive(Debug, Default)]
pub struct ChunkStore {
    chunks: HashMap<ChunkCoord, Chunk>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self { chunks: HashMap::new() }
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Insert a Pending entry. Returns `false` if the coordinate is taken.
    pub fn insert_pending(&mut self, coord: ChunkCoord) -> bool {
        if self.chunks.contains_key(&coord) {
            return false;
        }
        self.chunks.insert(coord, Chunk::pending(coord));
        true
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        self.chunks.remove(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Chunk> {
        self.chunks.values_mut()
    }

    pub fn coords(&self) -> impl Iterator<Item = &ChunkCoord> {
        self.chunks.keys()
    }

    /// Coordinates currently in `state`
    pub fn coords_in_state(&self, state: ChunkState) -> Vec<ChunkCoord> {
        self.chunks
            .values()
            .filter(|c| c.state() == state)
            .map(|c| c.coord)
            .collect()
    }

    pub fn state_counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for chunk in self.chunks.values() {
            match chunk.state() {
                ChunkState::Pending => {
                    counts.pending += 1;
                    if chunk.generation_failed() {
                        counts.failed += 1;
                    }
                }
                ChunkState::FadingIn => counts.fading_in += 1,
                ChunkState::Active => counts.active += 1,
                ChunkState::FadingOut => counts.fading_out += 1,
            }
        }
        counts
    }

    /// Advance every fade and erase chunks whose fade-out finished.
    ///
    /// Returns the removed coordinates.
    pub fn advance(&mut self, now: Instant, fade_in: Duration, fade_out: Duration) -> Vec<ChunkCoord> {
        let mut finished = Vec::new();
        for chunk in self.chunks.values_mut() {
            if chunk.advance(now, fade_in, fade_out) == FadeStep::Finished {
                finished.push(chunk.coord);
            }
        }
        for coord in &finished {
            self.chunks.remove(coord);
        }
        finished
    }

    /// Remove every entry, returning the coordinates that were held
    pub fn clear(&mut self) -> Vec<ChunkCoord> {
        self.chunks.drain().map(|(coord, _)| coord).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::MeshData;

    const FADE: Duration = Duration::from_millis(100);

    fn mesh(coord: ChunkCoord) -> MeshData {
        MeshData { coord, vertices: Vec::new() }
    }

    #[test]
    fn test_store_new() {
        let store = ChunkStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_pending_once() {
        let mut store = ChunkStore::new();
        let coord = ChunkCoord::new(-3, 7);
        assert!(store.insert_pending(coord));
        assert!(!store.insert_pending(coord));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(coord).unwrap().state(), ChunkState::Pending);
    }

    #[test]
    fn test_negative_and_positive_keys_distinct() {
        let mut store = ChunkStore::new();
        for (x, z) in [(-1, 0), (0, -1), (1, 0), (0, 1), (-1, -1)] {
            assert!(store.insert_pending(ChunkCoord::new(x, z)));
        }
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_remove() {
        let mut store = ChunkStore::new();
        let coord = ChunkCoord::new(1, 2);
        store.insert_pending(coord);
        let removed = store.remove(coord);
        assert_eq!(removed.unwrap().coord, coord);
        assert!(!store.contains(coord));
    }

    #[test]
    fn test_state_counts() {
        let t0 = Instant::now();
        let mut store = ChunkStore::new();
        for x in 0..4 {
            store.insert_pending(ChunkCoord::new(x, 0));
        }
        store.get_mut(ChunkCoord::new(0, 0)).unwrap().deliver(mesh(ChunkCoord::new(0, 0)), t0);
        store.get_mut(ChunkCoord::new(1, 0)).unwrap().mark_failed();

        let counts = store.state_counts();
        assert_eq!(counts.pending, 3);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.fading_in, 1);
        assert_eq!(counts.total(), 4);
        assert_eq!(store.coords_in_state(ChunkState::FadingIn), vec![ChunkCoord::new(0, 0)]);
    }

    #[test]
    fn test_advance_removes_finished_fade_out() {
        let t0 = Instant::now();
        let mut store = ChunkStore::new();
        let coord = ChunkCoord::new(5, 5);
        store.insert_pending(coord);
        store.get_mut(coord).unwrap().deliver(mesh(coord), t0);

        assert!(store.advance(t0 + FADE, FADE, FADE).is_empty());
        assert_eq!(store.get(coord).unwrap().state(), ChunkState::Active);

        let t1 = t0 + FADE;
        store.get_mut(coord).unwrap().begin_fade_out(t1);
        assert!(store.advance(t1 + FADE / 2, FADE, FADE).is_empty());
        assert_eq!(store.advance(t1 + FADE, FADE, FADE), vec![coord]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_reports_all() {
        let mut store = ChunkStore::new();
        store.insert_pending(ChunkCoord::new(0, 0));
        store.insert_pending(ChunkCoord::new(0, 1));
        let mut cleared = store.clear();
        cleared.sort();
        assert_eq!(cleared, vec![ChunkCoord::new(0, 0), ChunkCoord::new(0, 1)]);
        assert!(store.is_empty());
    }
}
