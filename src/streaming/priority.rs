//! Nearest-first scan order for the render window

use std::cmp::Ordering;

use crate::chunk::ChunkCoord;

/// Sort key for a window offset: ring first, then Euclidean distance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkPriority {
    pub dx: i32,
    pub dz: i32,
    pub ring: u32,        // Chebyshev distance from the centre chunk
    pub distance_sq: u64, // Squared Euclidean distance in chunks
}

impl ChunkPriority {
    pub fn new(dx: i32, dz: i32) -> Self {
        Self {
            dx,
            dz,
            ring: dx.unsigned_abs().max(dz.unsigned_abs()),
            distance_sq: (dx as i64 * dx as i64 + dz as i64 * dz as i64) as u64,
        }
    }
}

impl Ord for ChunkPriority {
    fn cmp(&self, other: &Self) -> Ordering {
        // Nearest first; offsets break ties so the order is stable
        self.ring
            .cmp(&other.ring)
            .then(self.distance_sq.cmp(&other.distance_sq))
            .then(self.dz.cmp(&other.dz))
            .then(self.dx.cmp(&other.dx))
    }
}

impl PartialOrd for ChunkPriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Offsets covering a square window of Chebyshev radius `radius`,
/// nearest ring first. Built once per radius and reused every tick.
#[derive(Clone, Debug)]
pub struct RingOrder {
    radius: u32,
    offsets: Vec<ChunkPriority>,
}

impl RingOrder {
    pub fn new(radius: u32) -> Self {
        let r = radius as i32;
        let mut offsets: Vec<ChunkPriority> = (-r..=r)
            .flat_map(|dz| (-r..=r).map(move |dx| ChunkPriority::new(dx, dz)))
            .collect();
        offsets.sort();
        Self { radius, offsets }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Window coordinates around `center`, nearest first
    pub fn around(&self, center: ChunkCoord) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.offsets.iter().map(move |p| center.offset(p.dx, p.dz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_size() {
        assert_eq!(RingOrder::new(0).len(), 1);
        assert_eq!(RingOrder::new(2).len(), 25);
        assert_eq!(RingOrder::new(8).len(), 289);
    }

    #[test]
    fn test_priority_far_offsets() {
        let far = ChunkPriority::new(-40_000, 40_000);
        assert_eq!(far.ring, 40_000);
        assert_eq!(far.distance_sq, 3_200_000_000);

        let extreme = ChunkPriority::new(i32::MIN, i32::MAX);
        assert_eq!(extreme.ring, 1 << 31);
        assert!(ChunkPriority::new(0, 1) < far && far < extreme);
    }

    #[test]
    fn test_center_first() {
        let order = RingOrder::new(3);
        let center = ChunkCoord::new(10, -4);
        assert_eq!(order.around(center).next(), Some(center));
    }

    #[test]
    fn test_rings_non_decreasing() {
        let order = RingOrder::new(4);
        let center = ChunkCoord::new(0, 0);
        let rings: Vec<u32> = order.around(center).map(|c| c.chebyshev_distance(center)).collect();
        assert!(rings.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*rings.last().unwrap(), 4);
    }

    #[test]
    fn test_edge_neighbours_before_corners() {
        let order = RingOrder::new(1);
        let coords: Vec<ChunkCoord> = order.around(ChunkCoord::new(0, 0)).collect();
        // Four edge neighbours (distance 1) precede the four corners (distance 2)
        for c in &coords[1..5] {
            assert_eq!(c.x.abs() + c.z.abs(), 1);
        }
        for c in &coords[5..] {
            assert_eq!(c.x.abs() + c.z.abs(), 2);
        }
    }

    #[test]
    fn test_covers_window_exactly_once() {
        let order = RingOrder::new(2);
        let center = ChunkCoord::new(-7, 3);
        let set: std::collections::HashSet<_> = order.around(center).collect();
        assert_eq!(set.len(), 25);
        assert!(set.iter().all(|c| c.chebyshev_distance(center) <= 2));
    }
}
