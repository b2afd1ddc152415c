//! Tick timing for the streaming loop

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long tick durations are kept for the rolling average
const HISTORY_WINDOW: Duration = Duration::from_secs(5);

/// Tracks per-tick timing for the control loop.
///
/// The controller itself takes `Instant`s explicitly; this is the
/// convenience wrapper a host loop uses to produce them.
pub struct FrameTimer {
    started: Instant,
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
    /// (timestamp, frame_time_secs), oldest first
    frame_history: VecDeque<(Instant, f32)>,
}

impl FrameTimer {
    /// Create a new frame timer starting now
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a timer with an explicit start instant
    pub fn starting_at(now: Instant) -> Self {
        Self {
            started: now,
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            frame_history: VecDeque::new(),
        }
    }

    /// Call once per tick with the current instant; returns it for chaining
    pub fn tick_at(&mut self, now: Instant) -> Instant {
        self.delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.frame_count += 1;

        self.frame_history.push_back((now, self.delta.as_secs_f32()));
        while let Some(&(timestamp, _)) = self.frame_history.front() {
            if now.saturating_duration_since(timestamp) > HISTORY_WINDOW {
                self.frame_history.pop_front();
            } else {
                break;
            }
        }

        now
    }

    /// Call once per tick using the wall clock
    pub fn tick(&mut self) -> Instant {
        self.tick_at(Instant::now())
    }

    /// Time since the previous tick
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Time since the previous tick in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Time since the timer was created
    pub fn elapsed(&self) -> Duration {
        self.last_frame.saturating_duration_since(self.started)
    }

    /// Total number of ticks
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average tick rate over the history window (0 when unknown)
    pub fn average_tps(&self) -> f32 {
        let total: f32 = self.frame_history.iter().map(|&(_, dt)| dt).sum();
        if total > 0.0 {
            self.frame_history.len() as f32 / total
        } else {
            0.0
        }
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
