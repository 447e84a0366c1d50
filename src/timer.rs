//! Countdown timers with eased progress sampling
//!
//! Everything animated in the game (player moves, the win/loss linger) samples
//! one of these. `update` is fed the host's frame delta; progress is clamped
//! so a degenerate duration can never leak NaN into a transform.

/// Back-easing overshoot constant (the usual c1 from the easings catalog)
const C1: f32 = 1.70158;
const C2: f32 = C1 * 1.525;
const C3: f32 = C1 + 1.0;

/// Elapsed-time accumulator with a target duration and clamped progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timer {
    duration: f32,
    time: f32,
}

impl Timer {
    /// A timer that must accumulate `duration` seconds before completing.
    ///
    /// A non-positive duration is legal: the timer reports progress 1.0 from
    /// the start and completes on the first `update` with any positive delta.
    pub fn new(duration: f32) -> Self {
        Self { duration, time: 0.0 }
    }

    /// A timer that is already complete
    pub fn expired() -> Self {
        Self {
            duration: 0.0,
            time: 1.0,
        }
    }

    /// Advance by `dt` seconds; negative deltas are ignored
    pub fn update(&mut self, dt: f32) {
        self.time += dt.max(0.0);
    }

    /// Rearm with a new duration, progress back to zero
    pub fn restart(&mut self, duration: f32) {
        self.duration = duration;
        self.time = 0.0;
    }

    /// True once strictly more than `duration` seconds have accumulated
    pub fn is_complete(&self) -> bool {
        self.time > self.duration
    }

    /// Linear progress in `[0, 1]`; a non-positive duration reads as 1.0
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.time / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Progress remapped through [`ease_out_back`]
    pub fn progress_out_back(&self) -> f32 {
        ease_out_back(self.progress())
    }

    /// Progress remapped through [`ease_in_out_back`]
    pub fn progress_in_out_back(&self) -> f32 {
        ease_in_out_back(self.progress())
    }
}

/// Overshooting ease-out: springs past 1.0 near the end and settles back
pub fn ease_out_back(x: f32) -> f32 {
    1.0 + C3 * (x - 1.0).powi(3) + C1 * (x - 1.0).powi(2)
}

/// Overshooting ease-in-out, piecewise around the midpoint
pub fn ease_in_out_back(x: f32) -> f32 {
    if x < 0.5 {
        ((2.0 * x).powi(2) * ((C2 + 1.0) * 2.0 * x - C2)) / 2.0
    } else {
        ((2.0 * x - 2.0).powi(2) * ((C2 + 1.0) * (2.0 * x - 2.0) + C2) + 2.0) / 2.0
    }
}
