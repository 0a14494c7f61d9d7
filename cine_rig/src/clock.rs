//! Frame clock.
//!
//! The renderer hands the rig an absolute timestamp each frame.  Elapsed
//! time is `now - base`, recomputed every tick rather than summed from
//! deltas, so steady frames never drift.  When the timestamp runs backwards
//! or jumps by more than `max_delta`, `base` is shifted so the visible step
//! is clamped to `[0, max_delta]`; a stalled window therefore resumes where
//! it stopped instead of skipping states.

/// Sanitised time for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    /// Seconds since the clock's first tick, minus any clamped-away time.
    pub elapsed: f64,
    /// Seconds since the previous tick, in `[0, max_delta]`.
    pub delta:   f32,
}

#[derive(Clone, Debug)]
pub struct FrameClock {
    max_delta: f64,
    base:      Option<f64>,
    elapsed:   f64,
}

impl FrameClock {
    pub fn new(max_delta: f32) -> Self {
        FrameClock { max_delta: f64::from(max_delta.max(0.0)), base: None, elapsed: 0.0 }
    }

    pub fn elapsed(&self) -> f64 { self.elapsed }

    /// Advance to the raw timestamp `now` (seconds, any origin).
    pub fn tick(&mut self, now: f64) -> FrameTime {
        if !now.is_finite() {
            return FrameTime { elapsed: self.elapsed, delta: 0.0 };
        }
        let base = *self.base.get_or_insert(now);
        let mut elapsed = now - base;
        let step = elapsed - self.elapsed;
        if step < 0.0 || step > self.max_delta {
            elapsed = self.elapsed + step.clamp(0.0, self.max_delta);
            self.base = Some(now - elapsed);
        }
        let delta = (elapsed - self.elapsed) as f32;
        self.elapsed = elapsed;
        FrameTime { elapsed, delta }
    }
}
