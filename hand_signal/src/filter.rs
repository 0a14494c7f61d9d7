//! One-pole low-pass filter.
//!
//! `y += (target − y) · gain` once per call.  With `gain ∈ (0, 1]` the output
//! moves monotonically toward the target and never overshoots.  The response
//! depends on call cadence, which is acceptable while samples arrive at a
//! roughly constant rate.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OnePoleFilter {
    gain:  f32,
    value: f32,
}

impl OnePoleFilter {
    pub fn new(gain: f32, initial: f32) -> Self {
        OnePoleFilter { gain: gain.clamp(f32::EPSILON, 1.0), value: initial }
    }

    pub fn gain(&self)  -> f32 { self.gain }
    pub fn value(&self) -> f32 { self.value }

    /// Jump straight to `value` without filtering.
    pub fn reset(&mut self, value: f32) {
        self.value = value;
    }

    /// Advance one sample toward `target` and return the new output.
    pub fn step(&mut self, target: f32) -> f32 {
        self.value += (target - self.value) * self.gain;
        self.value
    }
}
