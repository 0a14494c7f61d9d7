//! Gesture Signal Processor.
//!
//! One call per detector result.  Each call does a fixed amount of work:
//!
//! 1. **Presence gate**: palms smaller than `proximity_gate` count as "no
//!    hand".  Losing the hand clears the previous wrist and flips the store's
//!    hand flag once.
//! 2. **Re-entry sync**: the first usable sample after the hand returns (or
//!    after a scripted state handed morph control back) seeds the filter and
//!    the hysteresis from the store's current morph value, so the scene does
//!    not jump toward whatever the counters last believed.
//! 3. **Openness**: mean fingertip reach over palm scale, thresholded.
//! 4. **Motion gate**: samples where the wrist moved more than
//!    `motion_gate` since the last one do not vote.
//! 5. **Hysteresis**: see [`crate::hysteresis`].
//! 6. **Morph smoothing**: one-pole filter toward 0 (open) or 1 (closed),
//!    written to the store with the coarse shape flag.
//! 7. **Relative pointing**: wrist deltas nudge the store's yaw/pitch.
//! 8. The wrist is remembered for the next call.
//!
//! Steps 2, 5 and 6 only write while the current state accepts manual morph
//! input.  Step 7 only writes while the camera is interactive.

use glam::Vec3;
use tracing::{debug, info};

use scene_store::{PointingTarget, Shape, SharedStore};

use crate::config::GestureConfig;
use crate::error::Result;
use crate::filter::OnePoleFilter;
use crate::hysteresis::Hysteresis;
use crate::landmarks::LandmarkSample;

// ════════════════════════════════════════════════════════════════════════════
// Outputs
// ════════════════════════════════════════════════════════════════════════════

/// Hand-presence edge produced by a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresenceChange {
    Unchanged,
    Acquired,
    Lost,
}

/// Measurements from a sample that passed the presence gate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandReading {
    pub openness_ratio: f32,
    pub raw_open:       bool,
    /// Wrist travel since the previous sample (0 on the first one).
    pub speed:          f32,
    /// Whether the sample was counted by the hysteresis.
    pub voted:          bool,
    pub stable_open:    bool,
    /// Smoothed morph value, when this call was allowed to write it.
    pub morph:          Option<f32>,
    /// Pointing target after this call's nudge, if one was applied.
    pub pointing:       Option<PointingTarget>,
}

/// Result of one [`GestureProcessor::process`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureUpdate {
    pub presence: PresenceChange,
    pub reading:  Option<HandReading>,
}

/// Read-only snapshot of the processor's persistent state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureState {
    pub open_run_length:   u32,
    pub closed_run_length: u32,
    pub stable_open:       bool,
    pub smoothed_morph:    f32,
    pub previous_wrist:    Option<Vec3>,
    pub hand_present:      bool,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureProcessor
// ════════════════════════════════════════════════════════════════════════════

pub struct GestureProcessor {
    cfg:          GestureConfig,
    hysteresis:   Hysteresis,
    morph:        OnePoleFilter,
    prev_wrist:   Option<Vec3>,
    present:      bool,
    /// Set whenever the counters may disagree with the store's morph value.
    needs_sync:   bool,
}

impl GestureProcessor {
    pub fn new(cfg: GestureConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(GestureProcessor {
            hysteresis: Hysteresis::new(cfg.open_run_threshold, cfg.closed_run_threshold, true),
            morph:      OnePoleFilter::new(cfg.smoothing_gain, 0.0),
            prev_wrist: None,
            present:    false,
            needs_sync: true,
            cfg,
        })
    }

    pub fn config(&self) -> &GestureConfig { &self.cfg }

    pub fn state(&self) -> GestureState {
        GestureState {
            open_run_length:   self.hysteresis.open_run(),
            closed_run_length: self.hysteresis.closed_run(),
            stable_open:       self.hysteresis.stable_open(),
            smoothed_morph:    self.morph.value(),
            previous_wrist:    self.prev_wrist,
            hand_present:      self.present,
        }
    }

    /// Process one detector result.  `None` means the detector ran and found
    /// no hand; callers with no detector result at all should not call.
    pub fn process(&mut self, sample: Option<&LandmarkSample>, store: &mut SharedStore) -> GestureUpdate {
        if !store.gesture_tracking() {
            return self.lose_hand(store);
        }

        // The store dropped the hand without us (reset, tracking toggled
        // between samples).  Forget it so the next sample re-enters and syncs.
        if self.present && !store.hand_detected() {
            debug!("hand flag cleared externally, forcing re-entry");
            self.present = false;
            self.prev_wrist = None;
            self.needs_sync = true;
        }

        let gate = self.cfg.proximity_gate;
        let Some(sample) = sample.filter(|s| s.palm_scale() >= gate) else {
            return self.lose_hand(store);
        };

        let mut presence = PresenceChange::Unchanged;
        if !self.present {
            self.present = true;
            self.needs_sync = true;
            store.set_hand_detected(true);
            presence = PresenceChange::Acquired;
            info!(palm_scale = sample.palm_scale(), "hand acquired");
        }

        let state = store.state();
        let morph_writable = state.accepts_manual_morph();

        if morph_writable && self.needs_sync {
            self.sync_from(store);
        }

        let wrist = sample.wrist();
        let openness_ratio = sample.openness_ratio();
        let raw_open = openness_ratio > self.cfg.openness_ratio;
        let speed = self.prev_wrist.map_or(0.0, |p| wrist.distance(p));
        let voted = morph_writable && speed < self.cfg.motion_gate;

        let mut morph = None;
        if morph_writable {
            if voted && self.hysteresis.vote(raw_open) {
                debug!(open = self.hysteresis.stable_open(), openness_ratio, "gesture flipped");
            }
            let target = if self.hysteresis.stable_open() { 0.0 } else { 1.0 };
            let value = self.morph.step(target);
            store.set_morph_progress(value);
            store.set_shape(Shape::from_morph(value));
            morph = Some(value);
        } else {
            // Someone else owns the morph value right now; re-seed from it
            // once control comes back.
            self.needs_sync = true;
        }

        let mut pointing = None;
        if let (Some(prev), true) = (self.prev_wrist, state.is_interactive()) {
            let d = wrist - prev;
            let next = store
                .pointing_target()
                .unwrap_or_default()
                .nudged(-d.x * self.cfg.yaw_sensitivity, d.y * self.cfg.pitch_sensitivity);
            store.set_pointing_target(Some(next));
            pointing = Some(next);
        }

        self.prev_wrist = Some(wrist);

        GestureUpdate {
            presence,
            reading: Some(HandReading {
                openness_ratio,
                raw_open,
                speed,
                voted,
                stable_open: self.hysteresis.stable_open(),
                morph,
                pointing,
            }),
        }
    }

    /// Seed the filter and counters so the next classification agrees with
    /// what the scene currently shows.
    fn sync_from(&mut self, store: &SharedStore) {
        let current = store.morph_progress();
        let assembled = current > 0.5;
        self.morph.reset(current);
        self.hysteresis.seed(!assembled, self.cfg.reentry_seed_run);
        self.needs_sync = false;
        debug!(morph = current, assembled, "gesture state synced from store");
    }

    fn lose_hand(&mut self, store: &mut SharedStore) -> GestureUpdate {
        self.prev_wrist = None;
        let presence = if self.present {
            self.present = false;
            self.needs_sync = true;
            store.set_hand_detected(false);
            info!("hand lost");
            PresenceChange::Lost
        } else {
            PresenceChange::Unchanged
        };
        GestureUpdate { presence, reading: None }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
