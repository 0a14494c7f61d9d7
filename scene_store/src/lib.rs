//! # scene_store
//!
//! The single mutable resource shared by the gesture pipeline and the
//! cinematic camera.  Everything the renderer and the UI need each frame is
//! read from here; nothing else is shared between the two components.
//!
//! ## Field ownership
//!
//! Each field has one writer at a time.  Ownership of the morph value and the
//! pointing target follows the current [`CinematicState`]:
//!
//! | Field | Interactive states | Other states |
//! |---|---|---|
//! | `morph_progress`, `shape` | gesture processor / scroll wheel | state machine |
//! | `pointing_target` | gesture processor | nobody (cleared on journey start) |
//! | `ribbon_progress`, `state` | state machine | state machine |
//! | `hand_detected` | gesture processor | gesture processor |
//! | `gesture_tracking` | user toggle / state machine | state machine |
//!
//! The store itself does not enforce this; it is passed by `&mut` into each
//! per-frame call, so the borrow checker already rules out two writers inside
//! one call.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// CinematicState
// ════════════════════════════════════════════════════════════════════════════

/// The closed set of cinematic states.  Exactly one is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CinematicState {
    /// Particles scattered; user in control.
    #[default]
    Scattered,
    /// Scripted scatter → assembled morph; camera still interactive.
    Morphing,
    /// Fully assembled; user in control; a journey may start.
    Assembled,
    /// Ribbon grows up the tree, then a short dwell while the star lights.
    RibbonRise,
    /// Camera glides to the start of the flight path.
    PrepareFlight,
    /// Camera flies the spiral path.
    Flight,
    /// Camera returns to the wide shot for the closing show.
    Finale,
}

impl CinematicState {
    pub const ALL: [CinematicState; 7] = [
        CinematicState::Scattered,
        CinematicState::Morphing,
        CinematicState::Assembled,
        CinematicState::RibbonRise,
        CinematicState::PrepareFlight,
        CinematicState::Flight,
        CinematicState::Finale,
    ];

    /// True for the journey states that drive the camera on their own.
    pub fn is_autonomous(self) -> bool {
        matches!(
            self,
            CinematicState::RibbonRise
                | CinematicState::PrepareFlight
                | CinematicState::Flight
                | CinematicState::Finale
        )
    }

    /// True while the user's orbit controls own the camera.
    pub fn is_interactive(self) -> bool {
        !self.is_autonomous()
    }

    /// True when gestures and the scroll wheel may write the morph value.
    pub fn accepts_manual_morph(self) -> bool {
        matches!(self, CinematicState::Scattered | CinematicState::Assembled)
    }

    pub fn name(self) -> &'static str {
        match self {
            CinematicState::Scattered     => "Scattered",
            CinematicState::Morphing      => "Morphing",
            CinematicState::Assembled     => "Assembled",
            CinematicState::RibbonRise    => "RibbonRise",
            CinematicState::PrepareFlight => "PrepareFlight",
            CinematicState::Flight        => "Flight",
            CinematicState::Finale        => "Finale",
        }
    }
}

impl std::fmt::Display for CinematicState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Shape: the coarse scattered / assembled flag
// ════════════════════════════════════════════════════════════════════════════

/// Coarse reading of the morph value, written alongside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Shape {
    #[default]
    Scattered,
    Assembled,
}

impl Shape {
    /// Symmetric 0.5 split used by the gesture pipeline.
    pub fn from_morph(morph: f32) -> Self {
        if morph > 0.5 { Shape::Assembled } else { Shape::Scattered }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PointingTarget
// ════════════════════════════════════════════════════════════════════════════

/// Relative pointing accumulators.
///
/// `yaw` is unbounded (the orbit may spin freely); `pitch` is held in
/// `[-1, 1]`.  Both only ever move by deltas.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PointingTarget {
    pub yaw:   f32,
    pub pitch: f32,
}

impl PointingTarget {
    /// Return the target moved by `(d_yaw, d_pitch)` with pitch clamped.
    pub fn nudged(self, d_yaw: f32, d_pitch: f32) -> Self {
        PointingTarget {
            yaw:   self.yaw + d_yaw,
            pitch: (self.pitch + d_pitch).clamp(-1.0, 1.0),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SharedStore
// ════════════════════════════════════════════════════════════════════════════

/// Per-frame shared state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SharedStore {
    state:             CinematicState,
    shape:             Shape,
    morph_progress:    f32,
    ribbon_progress:   f32,
    gesture_tracking:  bool,
    hand_detected:     bool,
    pointing_target:   Option<PointingTarget>,
}

impl Default for SharedStore {
    fn default() -> Self {
        SharedStore {
            state:            CinematicState::Scattered,
            shape:            Shape::Scattered,
            morph_progress:   0.0,
            ribbon_progress:  0.0,
            gesture_tracking: false,
            hand_detected:    false,
            pointing_target:  None,
        }
    }
}

impl SharedStore {
    pub fn new() -> Self { Self::default() }

    // ── reads ─────────────────────────────────────────────────────────────

    pub fn state(&self)            -> CinematicState          { self.state }
    pub fn shape(&self)            -> Shape                   { self.shape }
    pub fn morph_progress(&self)   -> f32                     { self.morph_progress }
    pub fn ribbon_progress(&self)  -> f32                     { self.ribbon_progress }
    pub fn gesture_tracking(&self) -> bool                    { self.gesture_tracking }
    pub fn hand_detected(&self)    -> bool                    { self.hand_detected }
    pub fn pointing_target(&self)  -> Option<PointingTarget>  { self.pointing_target }

    /// True when gestures currently drive the orbit camera.
    pub fn hand_steering(&self) -> bool {
        self.gesture_tracking && self.hand_detected && self.pointing_target.is_some()
    }

    // ── writes ────────────────────────────────────────────────────────────

    pub fn set_state(&mut self, state: CinematicState) {
        self.state = state;
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }

    /// Write the morph value, clamped to `[0, 1]`.  Non-finite values are
    /// dropped so one bad sample cannot poison every consumer.
    pub fn set_morph_progress(&mut self, progress: f32) {
        if progress.is_finite() {
            self.morph_progress = progress.clamp(0.0, 1.0);
        }
    }

    /// Write the ribbon value, clamped to `[0, 1]`.
    pub fn set_ribbon_progress(&mut self, progress: f32) {
        if progress.is_finite() {
            self.ribbon_progress = progress.clamp(0.0, 1.0);
        }
    }

    /// Turn gesture tracking on or off.  Turning it off also clears the
    /// hand flag, since no samples will arrive to clear it later.
    pub fn set_gesture_tracking(&mut self, enabled: bool) {
        self.gesture_tracking = enabled;
        if !enabled {
            self.hand_detected = false;
        }
    }

    pub fn set_hand_detected(&mut self, detected: bool) {
        self.hand_detected = detected;
    }

    /// Replace the pointing target.  Pitch is clamped on the way in.
    pub fn set_pointing_target(&mut self, target: Option<PointingTarget>) {
        self.pointing_target = target.map(|t| PointingTarget {
            yaw:   t.yaw,
            pitch: t.pitch.clamp(-1.0, 1.0),
        });
    }

    /// Back to the initial experience: scattered, empty, no hand.
    /// Whether tracking is switched on is a user preference and survives.
    pub fn reset(&mut self) {
        let tracking = self.gesture_tracking;
        *self = SharedStore::default();
        self.gesture_tracking = tracking;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
