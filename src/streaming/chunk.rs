//! Per-chunk lifecycle: state machine and fade alpha

use std::time::{Duration, Instant};

use crate::chunk::ChunkCoord;
use crate::terrain::MeshData;

/// Lifecycle state of a chunk held in a store.
///
/// A coordinate without a store entry is "not present".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Requested, waiting for its mesh
    Pending,
    /// Mesh arrived, alpha rising
    FadingIn,
    /// Fully visible
    Active,
    /// Left the window, alpha falling
    FadingOut,
}

/// Result of advancing a chunk's fade
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeStep {
    Unchanged,
    /// FadingIn reached alpha 1
    BecameActive,
    /// FadingOut reached alpha 0; the chunk should be released
    Finished,
}

/// A streamed chunk (terrain tile or water plane)
#[derive(Clone, Debug)]
pub struct Chunk {
    pub coord: ChunkCoord,
    mesh: Option<MeshData>,
    state: ChunkState,
    alpha: f32,
    fade_start: Option<Instant>,
    /// Alpha at the start of the current fade phase
    fade_from: f32,
    generation_failed: bool,
}

impl Chunk {
    /// A freshly requested chunk
    pub fn pending(coord: ChunkCoord) -> Self {
        Self {
            coord,
            mesh: None,
            state: ChunkState::Pending,
            alpha: 0.0,
            fade_start: None,
            fade_from: 0.0,
            generation_failed: false,
        }
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn mesh(&self) -> Option<&MeshData> {
        self.mesh.as_ref()
    }

    pub fn fade_start(&self) -> Option<Instant> {
        self.fade_start
    }

    /// Whether the last generation attempt for this chunk failed
    pub fn generation_failed(&self) -> bool {
        self.generation_failed
    }

    /// Whether the renderer should draw this chunk
    pub fn is_visible(&self) -> bool {
        self.mesh.is_some() && self.state != ChunkState::Pending
    }

    /// Pending → FadingIn with the generated mesh
    pub fn deliver(&mut self, mesh: MeshData, now: Instant) -> bool {
        if self.state != ChunkState::Pending {
            return false;
        }
        self.mesh = Some(mesh);
        self.generation_failed = false;
        self.start_fade(ChunkState::FadingIn, now);
        true
    }

    /// Record a failed generation; the chunk stays Pending
    pub fn mark_failed(&mut self) {
        if self.state == ChunkState::Pending {
            self.generation_failed = true;
        }
    }

    /// Active/FadingIn → FadingOut
    pub fn begin_fade_out(&mut self, now: Instant) -> bool {
        match self.state {
            ChunkState::Active | ChunkState::FadingIn => {
                self.start_fade(ChunkState::FadingOut, now);
                true
            }
            _ => false,
        }
    }

    /// FadingOut → FadingIn from the current alpha, keeping this entry
    pub fn resurrect(&mut self, now: Instant) -> bool {
        if self.state != ChunkState::FadingOut {
            return false;
        }
        self.start_fade(ChunkState::FadingIn, now);
        true
    }

    fn start_fade(&mut self, state: ChunkState, now: Instant) {
        self.state = state;
        self.fade_from = self.alpha;
        self.fade_start = Some(now);
    }

    /// Advance alpha for fading states
    pub fn advance(&mut self, now: Instant, fade_in: Duration, fade_out: Duration) -> FadeStep {
        let duration = match self.state {
            ChunkState::FadingIn => fade_in,
            ChunkState::FadingOut => fade_out,
            ChunkState::Pending | ChunkState::Active => return FadeStep::Unchanged,
        };

        let elapsed = self
            .fade_start
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or(duration);
        let t = if duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
        };

        if self.state == ChunkState::FadingIn {
            if t >= 1.0 {
                self.state = ChunkState::Active;
                self.alpha = 1.0;
                self.fade_start = None;
                return FadeStep::BecameActive;
            }
            self.alpha = (self.fade_from + (1.0 - self.fade_from) * t).clamp(0.0, 1.0);
        } else {
            if t >= 1.0 {
                self.alpha = 0.0;
                return FadeStep::Finished;
            }
            self.alpha = (self.fade_from * (1.0 - t)).clamp(0.0, 1.0);
        }
        FadeStep::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FADE: Duration = Duration::from_millis(2000);

    fn mesh(coord: ChunkCoord) -> MeshData {
        MeshData { coord, vertices: Vec::new() }
    }

    fn delivered(now: Instant) -> Chunk {
        let coord = ChunkCoord::new(0, 0);
        let mut chunk = Chunk::pending(coord);
        assert!(chunk.deliver(mesh(coord), now));
        chunk
    }

    #[test]
    fn test_pending_defaults() {
        let chunk = Chunk::pending(ChunkCoord::new(3, -4));
        assert_eq!(chunk.state(), ChunkState::Pending);
        assert_eq!(chunk.alpha(), 0.0);
        assert!(chunk.mesh().is_none());
        assert!(!chunk.is_visible());
    }

    #[test]
    fn test_deliver_starts_fade_in() {
        let t0 = Instant::now();
        let chunk = delivered(t0);
        assert_eq!(chunk.state(), ChunkState::FadingIn);
        assert_eq!(chunk.alpha(), 0.0);
        assert_eq!(chunk.fade_start(), Some(t0));
        assert!(chunk.is_visible());
    }

    #[test]
    fn test_deliver_only_from_pending() {
        let t0 = Instant::now();
        let mut chunk = delivered(t0);
        assert!(!chunk.deliver(mesh(chunk.coord), t0));
    }

    #[test]
    fn test_fade_in_is_monotonic_and_ends_active() {
        let t0 = Instant::now();
        let mut chunk = delivered(t0);
        let mut prev = 0.0;
        for ms in (0..=2000).step_by(100) {
            let step = chunk.advance(t0 + Duration::from_millis(ms), FADE, FADE);
            assert!((0.0..=1.0).contains(&chunk.alpha()));
            assert!(chunk.alpha() >= prev);
            prev = chunk.alpha();
            if ms < 2000 {
                assert_eq!(step, FadeStep::Unchanged);
            } else {
                assert_eq!(step, FadeStep::BecameActive);
            }
        }
        assert_eq!(chunk.state(), ChunkState::Active);
        assert_eq!(chunk.alpha(), 1.0);
    }

    #[test]
    fn test_fade_out_is_monotonic_and_finishes() {
        let t0 = Instant::now();
        let mut chunk = delivered(t0);
        chunk.advance(t0 + FADE, FADE, FADE);
        assert_eq!(chunk.state(), ChunkState::Active);

        let t1 = t0 + Duration::from_secs(10);
        assert!(chunk.begin_fade_out(t1));
        let mut prev = 1.0;
        for ms in (0..2000).step_by(250) {
            let step = chunk.advance(t1 + Duration::from_millis(ms), FADE, FADE);
            assert_eq!(step, FadeStep::Unchanged);
            assert!(chunk.alpha() <= prev);
            prev = chunk.alpha();
        }
        assert_eq!(chunk.advance(t1 + FADE, FADE, FADE), FadeStep::Finished);
        assert_eq!(chunk.alpha(), 0.0);
    }

    #[test]
    fn test_fade_out_from_partial_fade_in_does_not_jump() {
        let t0 = Instant::now();
        let mut chunk = delivered(t0);
        chunk.advance(t0 + Duration::from_millis(500), FADE, FADE);
        let partial = chunk.alpha();
        assert!((partial - 0.25).abs() < 1e-4);

        let t1 = t0 + Duration::from_millis(500);
        assert!(chunk.begin_fade_out(t1));
        chunk.advance(t1, FADE, FADE);
        assert!((chunk.alpha() - partial).abs() < 1e-6);
        chunk.advance(t1 + Duration::from_millis(1000), FADE, FADE);
        assert!(chunk.alpha() < partial);
    }

    #[test]
    fn test_resurrect_reverses_fade() {
        let t0 = Instant::now();
        let mut chunk = delivered(t0);
        chunk.advance(t0 + FADE, FADE, FADE);
        let t1 = t0 + FADE;
        chunk.begin_fade_out(t1);
        chunk.advance(t1 + Duration::from_millis(1000), FADE, FADE);
        let half = chunk.alpha();
        assert!((half - 0.5).abs() < 1e-4);

        let t2 = t1 + Duration::from_millis(1000);
        assert!(chunk.resurrect(t2));
        assert_eq!(chunk.state(), ChunkState::FadingIn);
        chunk.advance(t2, FADE, FADE);
        assert!((chunk.alpha() - half).abs() < 1e-6);
        chunk.advance(t2 + Duration::from_millis(1000), FADE, FADE);
        assert!(chunk.alpha() > half);
        assert_eq!(chunk.advance(t2 + FADE, FADE, FADE), FadeStep::BecameActive);
    }

    #[test]
    fn test_resurrect_only_from_fading_out() {
        let t0 = Instant::now();
        let mut chunk = Chunk::pending(ChunkCoord::new(1, 1));
        assert!(!chunk.resurrect(t0));
        assert!(!chunk.begin_fade_out(t0));
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let t0 = Instant::now();
        let mut chunk = delivered(t0);
        assert_eq!(chunk.advance(t0, Duration::ZERO, Duration::ZERO), FadeStep::BecameActive);
        chunk.begin_fade_out(t0);
        assert_eq!(chunk.advance(t0, Duration::ZERO, Duration::ZERO), FadeStep::Finished);
    }

    #[test]
    fn test_mark_failed_keeps_pending() {
        let mut chunk = Chunk::pending(ChunkCoord::new(0, 1));
        chunk.mark_failed();
        assert_eq!(chunk.state(), ChunkState::Pending);
        assert!(chunk.generation_failed());

        assert!(chunk.deliver(mesh(chunk.coord), Instant::now()));
        assert!(!chunk.generation_failed());
    }
}
