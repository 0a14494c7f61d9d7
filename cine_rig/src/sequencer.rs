//! Cinematic camera state machine.
//!
//! ## States
//!
//! | State | On entry | Leaves when | Next |
//! |---|---|---|---|
//! | `Scattered` | orbit enabled | morph > `assemble_above` | `Assembled` |
//! | `Morphing` | remember start morph | `morph_duration` elapsed | `Assembled` |
//! | `Assembled` | orbit enabled, sent home | `start_journey` | `RibbonRise` |
//! | `RibbonRise` | ribbon 0, orbit disabled | ribbon full + `star_dwell` | `PrepareFlight` |
//! | `PrepareFlight` | ease to the path start | `prepare_duration` | `Flight` |
//! | `Flight` | orbit disabled | `u` reaches 1 | `Finale` |
//! | `Finale` | ease to the home viewpoint | `finale_duration` | `Assembled` |
//!
//! `exit_journey` returns to `Assembled` from any autonomous state; `reset`
//! returns to `Scattered` from anywhere.
//!
//! ## Tick order
//!
//! 1. Sanitise the frame time ([`FrameClock`]).
//! 2. Advance the active state's progress and take at most one transition.
//! 3. Write the camera: the flight path drives it in `Flight`, the orbit
//!    controller in every other state.  Never both.
//!
//! All timers are `now - entered_at`, recomputed every tick.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec2, Vec3};
use tracing::{debug, info};

use scene_store::{CinematicState, Shape, SharedStore};
use spiral_path::{generate_spiral_path, Curve3D};

use crate::clock::{FrameClock, FrameTime};
use crate::config::{InputConfig, RigConfig, SequenceConfig};
use crate::error::Result;
use crate::orbit::{look_rotation, CameraPose, OrbitController};

// ════════════════════════════════════════════════════════════════════════════
// Frame output
// ════════════════════════════════════════════════════════════════════════════

/// Which controller wrote the camera this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drive {
    Orbit,
    Path,
}

/// Everything the renderer needs from one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFrame {
    pub time:  FrameTime,
    pub state: CinematicState,
    pub pose:  CameraPose,
    pub drive: Drive,
    /// Flight parameter, on ticks where the path drove the camera.
    pub u:     Option<f32>,
}

/// Arrow keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbitKey {
    Left,
    Right,
    Up,
    Down,
}

/// Flight camera at `u`: on the path, looking along the tangent pulled
/// toward the spiral axis, then turned by the pointer overlay.
///
/// Returns the pose and the un-overlaid look target.
pub fn flight_pose(path: &Curve3D, u: f32, pointer: Vec2, cfg: &SequenceConfig) -> (CameraPose, Vec3) {
    let position = path.point_at(u);
    let look = look_target(path, u, cfg.center_pull);
    let p = pointer.clamp(Vec2::NEG_ONE, Vec2::ONE);
    let yaw = -p.x * cfg.look_yaw_limit;
    let pitch = p.y * cfg.look_pitch_limit;
    let orientation = look_rotation(look - position)
        * Quat::from_rotation_y(yaw)
        * Quat::from_rotation_x(pitch);
    (CameraPose { position, orientation }, look)
}

fn look_target(path: &Curve3D, u: f32, center_pull: f32) -> Vec3 {
    let position = path.point_at(u);
    let ahead = position + path.tangent_at(u);
    let axis = Vec3::new(0.0, position.y, 0.0);
    ahead.lerp(axis, center_pull)
}

// ════════════════════════════════════════════════════════════════════════════
// Sequencer
// ════════════════════════════════════════════════════════════════════════════

pub struct Sequencer {
    seq:   SequenceConfig,
    input: InputConfig,
    path:  Curve3D,
    orbit: OrbitController,
    clock: FrameClock,

    /// Sanitised time of the latest tick.
    now:            f64,
    entered_at:     f64,
    ribbon_full_at: Option<f64>,
    morph_from:     f32,

    pose:        CameraPose,
    drive:       Drive,
    /// Look target of the last path-driven frame; the orbit resumes from it.
    path_look:   Vec3,
}

impl Sequencer {
    pub fn new(cfg: &RigConfig) -> Result<Self> {
        let p = &cfg.path;
        let path = generate_spiral_path(p.height, p.radius, p.turns)?
            .translated(Vec3::new(0.0, p.y_offset, 0.0))?;
        let orbit = OrbitController::new(cfg.orbit.clone());
        let pose = orbit.pose();
        info!(length = path.length(), points = path.points().len(), "flight path ready");
        Ok(Sequencer {
            seq:            cfg.sequence.clone(),
            input:          cfg.input.clone(),
            path,
            orbit,
            clock:          FrameClock::new(cfg.sequence.max_frame_delta),
            now:            0.0,
            entered_at:     0.0,
            ribbon_full_at: None,
            morph_from:     0.0,
            pose,
            drive:          Drive::Orbit,
            path_look:      Vec3::ZERO,
        })
    }

    pub fn path(&self)  -> &Curve3D         { &self.path }
    pub fn orbit(&self) -> &OrbitController { &self.orbit }
    pub fn pose(&self)  -> CameraPose       { self.pose }
    pub fn drive(&self) -> Drive            { self.drive }
    pub fn now(&self)   -> f64              { self.now }

    /// Seconds spent in the current state.
    pub fn time_in_state(&self) -> f64 { self.now - self.entered_at }

    // ── commands ──────────────────────────────────────────────────────────

    /// Begin the cinematic journey.  Ignored while a journey is already
    /// running or while the scene is less than `journey_gate` assembled.
    pub fn start_journey(&mut self, store: &mut SharedStore) -> bool {
        let state = store.state();
        let morph = store.morph_progress();
        if state.is_autonomous() || morph < self.seq.journey_gate {
            debug!(%state, morph, "start journey ignored");
            return false;
        }
        store.set_ribbon_progress(0.0);
        store.set_gesture_tracking(false);
        store.set_hand_detected(false);
        store.set_pointing_target(None);
        self.enter(CinematicState::RibbonRise, store);
        true
    }

    /// Abandon the journey and return to the assembled scene.  Ignored
    /// when no journey is running.
    pub fn exit_journey(&mut self, store: &mut SharedStore) -> bool {
        let state = store.state();
        if !state.is_autonomous() {
            debug!(%state, "exit journey ignored");
            return false;
        }
        store.set_ribbon_progress(0.0);
        self.enter(CinematicState::Assembled, store);
        true
    }

    /// Scripted assembly from `Scattered`.
    pub fn assemble(&mut self, store: &mut SharedStore) -> bool {
        if store.state() != CinematicState::Scattered {
            debug!(state = %store.state(), "assemble ignored");
            return false;
        }
        self.enter(CinematicState::Morphing, store);
        true
    }

    /// Back to the initial experience.
    pub fn reset(&mut self, store: &mut SharedStore) {
        self.enter(CinematicState::Scattered, store);
        store.reset();
    }

    // ── manual input ──────────────────────────────────────────────────────

    /// Mouse wheel: nudge the morph value.  Returns whether it was applied.
    pub fn on_scroll(&mut self, delta_y: f32, store: &mut SharedStore) -> bool {
        let state = store.state();
        if !state.accepts_manual_morph() {
            debug!(%state, "scroll ignored");
            return false;
        }
        if store.gesture_tracking() && store.hand_detected() {
            debug!("scroll ignored, hand owns morph");
            return false;
        }

        let next = (store.morph_progress() + delta_y * self.input.scroll_gain).clamp(0.0, 1.0);
        store.set_morph_progress(next);
        store.set_shape(Shape::from_morph(next));

        if next < self.input.scatter_below && state != CinematicState::Scattered {
            self.enter(CinematicState::Scattered, store);
        } else if next > self.input.assemble_above && state == CinematicState::Scattered {
            self.enter(CinematicState::Assembled, store);
        }
        true
    }

    /// Arrow keys: orbit and pan.  Returns whether the key was applied.
    pub fn on_key(&mut self, key: OrbitKey, store: &SharedStore) -> bool {
        let state = store.state();
        if state.is_autonomous() {
            debug!(%state, ?key, "key ignored");
            return false;
        }
        let step = self.input.rotate_step;
        let pan = self.input.pan_step;
        let y = self.orbit.target_goal().y;
        match key {
            OrbitKey::Left  => self.orbit.rotate(-step, 0.0),
            OrbitKey::Right => self.orbit.rotate(step, 0.0),
            OrbitKey::Up    => y < self.input.pan_max_y && self.orbit.pan_vertical(pan),
            OrbitKey::Down  => y > self.input.pan_min_y && self.orbit.pan_vertical(-pan),
        }
    }

    /// Shift+wheel: move the orbit camera nearer or farther.
    pub fn on_dolly(&mut self, delta_y: f32, store: &SharedStore) -> bool {
        let state = store.state();
        if state.is_autonomous() {
            debug!(%state, "dolly ignored");
            return false;
        }
        let radius = self.orbit.goal().radius;
        self.orbit.dolly_to(radius * (1.0 + delta_y * self.input.dolly_gain))
    }

    // ── per-frame ─────────────────────────────────────────────────────────

    /// Advance one frame.  `now` is the renderer's clock in seconds;
    /// `pointer` is the normalised pointer position in `[-1, 1]²`.
    pub fn tick(&mut self, now: f64, pointer: Vec2, store: &mut SharedStore) -> CameraFrame {
        let time = self.clock.tick(now);
        self.now = time.elapsed;

        let u = self.advance(store);

        let state = store.state();
        let (pose, drive) = match (state, u) {
            (_, Some(u)) => {
                let (pose, look) = flight_pose(&self.path, u, pointer, &self.seq);
                self.path_look = look;
                (pose, Drive::Path)
            }
            (s, None) if s.is_interactive() => {
                self.orbit.set_enabled(true);
                if store.hand_steering() {
                    if let Some(t) = store.pointing_target() {
                        self.orbit.rotate_to(t.yaw * PI, FRAC_PI_2 + t.pitch * PI / 6.0);
                    }
                }
                (self.orbit.update(time.delta), Drive::Orbit)
            }
            _ => {
                self.orbit.set_enabled(false);
                (self.orbit.update(time.delta), Drive::Orbit)
            }
        };
        self.pose = pose;
        self.drive = drive;

        CameraFrame { time, state: store.state(), pose, drive, u }
    }

    /// Progress the active state and take its exit if due.  Returns the
    /// flight parameter when this frame belongs to the flight.
    fn advance(&mut self, store: &mut SharedStore) -> Option<f32> {
        let t = self.time_in_state();
        match store.state() {
            CinematicState::Scattered => {
                if store.morph_progress() > self.input.assemble_above {
                    self.enter(CinematicState::Assembled, store);
                }
                None
            }
            CinematicState::Assembled => {
                // With a hand in view the gesture pipeline owns the shape.
                if store.gesture_tracking() && store.hand_detected() && store.shape() == Shape::Scattered {
                    self.enter(CinematicState::Scattered, store);
                }
                None
            }
            CinematicState::Morphing => {
                let k = (t / f64::from(self.seq.morph_duration)).min(1.0) as f32;
                let morph = self.morph_from + (1.0 - self.morph_from) * k;
                store.set_morph_progress(morph);
                store.set_shape(Shape::from_morph(morph));
                if k >= 1.0 {
                    self.enter(CinematicState::Assembled, store);
                }
                None
            }
            CinematicState::RibbonRise => {
                let ribbon = (t * f64::from(self.seq.ribbon_rate)).min(1.0);
                store.set_ribbon_progress(ribbon as f32);
                if ribbon >= 1.0 {
                    let full_at = *self.ribbon_full_at.get_or_insert(self.now);
                    if self.now - full_at >= f64::from(self.seq.star_dwell) {
                        self.enter(CinematicState::PrepareFlight, store);
                    }
                }
                None
            }
            CinematicState::PrepareFlight => {
                if t >= f64::from(self.seq.prepare_duration) {
                    self.enter(CinematicState::Flight, store);
                    return Some(0.0);
                }
                None
            }
            CinematicState::Flight => {
                let raw = t / f64::from(self.seq.flight_duration);
                if raw >= 1.0 {
                    // The last path frame lands exactly on the end of the
                    // curve; the orbit takes over from there next frame.
                    self.drive = Drive::Path;
                    self.pose = flight_pose(&self.path, 1.0, Vec2::ZERO, &self.seq).0;
                    self.path_look = look_target(&self.path, 1.0, self.seq.center_pull);
                    self.enter(CinematicState::Finale, store);
                    return Some(1.0);
                }
                Some((raw as f32).min(1.0))
            }
            CinematicState::Finale => {
                if t >= f64::from(self.seq.finale_duration) {
                    self.enter(CinematicState::Assembled, store);
                }
                None
            }
        }
    }

    /// Switch state, stamp the entry time and run the entry action.
    fn enter(&mut self, next: CinematicState, store: &mut SharedStore) {
        let prev = store.state();
        store.set_state(next);
        self.entered_at = self.now;
        self.ribbon_full_at = None;
        info!(from = %prev, to = %next, at = self.now, "state transition");

        // Leaving the path: the orbit resumes from where the path left the
        // camera rather than where the orbit last was.
        if self.drive == Drive::Path {
            self.orbit.jump_to(self.pose.position, self.path_look);
            self.drive = Drive::Orbit;
        }

        match next {
            CinematicState::Scattered => {
                self.orbit.set_enabled(true);
            }
            CinematicState::Morphing => {
                self.morph_from = store.morph_progress();
                self.orbit.set_enabled(true);
            }
            CinematicState::Assembled => {
                self.orbit.set_enabled(true);
                self.orbit.go_home();
            }
            CinematicState::RibbonRise => {
                store.set_ribbon_progress(0.0);
                store.set_pointing_target(None);
                self.orbit.set_enabled(false);
            }
            CinematicState::PrepareFlight => {
                self.orbit.set_enabled(false);
                let start = self.path.point_at(0.0);
                let look = look_target(&self.path, 0.0, self.seq.center_pull);
                self.orbit.set_look_at(start, look);
            }
            CinematicState::Flight => {
                self.orbit.set_enabled(false);
            }
            CinematicState::Finale => {
                self.orbit.set_enabled(false);
                self.orbit.go_home();
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use scene_store::PointingTarget;

    const FPS: f64 = 60.0;

    fn setup() -> (Sequencer, SharedStore) {
        let seq = Sequencer::new(&RigConfig::default()).unwrap();
        (seq, SharedStore::new())
    }

    /// Assembled scene at t = 0 with the given morph value.
    fn assembled(morph: f32) -> (Sequencer, SharedStore) {
        let (mut seq, mut store) = setup();
        store.set_morph_progress(morph);
        store.set_state(CinematicState::Assembled);
        seq.tick(0.0, Vec2::ZERO, &mut store);
        (seq, store)
    }

    fn at(frame: u32) -> f64 { frame as f64 / FPS }

    /// Tick frames `from..` until `state` is reached; return that frame.
    fn run_until(seq: &mut Sequencer, store: &mut SharedStore, from: u32, state: CinematicState) -> u32 {
        for f in from..from + 20_000 {
            seq.tick(at(f), Vec2::ZERO, store);
            if store.state() == state {
                return f;
            }
        }
        panic!("never reached {}", state);
    }

    #[test]
    fn journey_gate() {
        let (mut seq, mut store) = assembled(0.5);
        assert!(!seq.start_journey(&mut store));
        assert_eq!(store.state(), CinematicState::Assembled);

        store.set_morph_progress(0.85);
        assert!(seq.start_journey(&mut store));
        assert_eq!(store.state(), CinematicState::RibbonRise);
    }

    #[test]
    fn start_journey_takes_over_inputs() {
        let (mut seq, mut store) = assembled(1.0);
        store.set_gesture_tracking(true);
        store.set_hand_detected(true);
        store.set_pointing_target(Some(PointingTarget { yaw: 0.3, pitch: 0.2 }));
        store.set_ribbon_progress(0.6);

        seq.start_journey(&mut store);
        assert!(!store.gesture_tracking());
        assert!(!store.hand_detected());
        assert_eq!(store.pointing_target(), None);
        assert_eq!(store.ribbon_progress(), 0.0);
        assert!(!seq.orbit().enabled());
        // A second start while running is ignored.
        assert!(!seq.start_journey(&mut store));
    }

    #[test]
    fn ribbon_rises_for_four_seconds_then_dwells() {
        let (mut seq, mut store) = assembled(1.0);
        seq.start_journey(&mut store);

        for f in 1..240 {
            seq.tick(at(f), Vec2::ZERO, &mut store);
            assert!(store.ribbon_progress() < 1.0);
            assert_eq!(store.state(), CinematicState::RibbonRise);
        }
        seq.tick(at(240), Vec2::ZERO, &mut store);
        assert_eq!(store.ribbon_progress(), 1.0);
        assert_eq!(store.state(), CinematicState::RibbonRise);

        let f = run_until(&mut seq, &mut store, 241, CinematicState::PrepareFlight);
        assert_eq!(f, 300, "prepare should start 1 s after the ribbon fills");
    }

    #[test]
    fn prepare_eases_toward_path_start() {
        let (mut seq, mut store) = assembled(1.0);
        seq.start_journey(&mut store);
        let entered = run_until(&mut seq, &mut store, 1, CinematicState::PrepareFlight);
        let goal = seq.orbit().goal_position();
        assert!(goal.distance(seq.path().point_at(0.0)) < 1e-3);

        let flight = run_until(&mut seq, &mut store, entered + 1, CinematicState::Flight);
        assert_eq!(flight - entered, 90);
    }

    #[test]
    fn flight_ends_on_the_tick_u_reaches_one() {
        let (mut seq, mut store) = assembled(1.0);
        seq.start_journey(&mut store);
        let start = run_until(&mut seq, &mut store, 1, CinematicState::Flight);
        let entered = seq.now();

        let mut last_u = 0.0;
        let mut f = start + 1;
        loop {
            let frame = seq.tick(at(f), Vec2::ZERO, &mut store);
            assert_eq!(frame.drive, Drive::Path);
            let u = frame.u.unwrap();
            assert!(u >= last_u);
            last_u = u;
            if store.state() != CinematicState::Flight {
                assert_eq!(store.state(), CinematicState::Finale);
                assert_eq!(u, 1.0);
                assert!(frame.time.elapsed - entered >= 90.0);
                assert!(frame.pose.position.distance(seq.path().point_at(1.0)) < 1e-4);
                break;
            }
            assert!(frame.time.elapsed - entered < 90.0);
            f += 1;
        }
        assert_eq!(f - start, 5400);

        // The orbit takes over from the end of the path.
        let next = seq.tick(at(f + 1), Vec2::ZERO, &mut store);
        assert_eq!(next.drive, Drive::Orbit);
        assert!(next.pose.position.distance(seq.path().point_at(1.0)) < 0.5);
    }

    #[test]
    fn finale_returns_to_assembled_home() {
        let (mut seq, mut store) = assembled(1.0);
        seq.start_journey(&mut store);
        let finale = run_until(&mut seq, &mut store, 1, CinematicState::Finale);
        let back = run_until(&mut seq, &mut store, finale + 1, CinematicState::Assembled);
        assert_eq!(back - finale, 750);
        assert!(seq.orbit().enabled());
        assert!(seq.orbit().goal_position().distance(Vec3::new(0.0, 6.0, 50.0)) < 1e-3);
    }

    #[test]
    fn flight_look_target_blends_toward_axis() {
        let (seq, _) = setup();
        let cfg = SequenceConfig::default();
        let (pose, look) = flight_pose(seq.path(), 0.3, Vec2::ZERO, &cfg);
        let p = seq.path().point_at(0.3);
        let ahead = p + seq.path().tangent_at(0.3);
        let expected = ahead * 0.7 + Vec3::new(0.0, p.y, 0.0) * 0.3;
        assert!(look.distance(expected) < 1e-4);
        assert!(pose.forward().dot((look - p).normalize()) > 0.9999);
    }

    #[test]
    fn pointer_overlay_is_bounded() {
        let (seq, _) = setup();
        let cfg = SequenceConfig::default();
        let (base, _) = flight_pose(seq.path(), 0.5, Vec2::ZERO, &cfg);
        let (far, _) = flight_pose(seq.path(), 0.5, Vec2::new(5.0, 0.0), &cfg);
        let (edge, _) = flight_pose(seq.path(), 0.5, Vec2::new(1.0, 0.0), &cfg);
        assert_eq!(far, edge);
        let angle = base.forward().angle_between(edge.forward());
        assert!((angle - PI / 3.0).abs() < 1e-3);
        assert_eq!(base.position, edge.position);
    }

    #[test]
    fn exit_outside_a_journey_is_ignored() {
        let (mut seq, mut store) = setup();
        seq.tick(0.0, Vec2::ZERO, &mut store);
        assert!(!seq.exit_journey(&mut store));
        assert_eq!(store.state(), CinematicState::Scattered);

        let (mut seq, mut store) = assembled(0.9);
        store.set_ribbon_progress(0.4);
        assert!(!seq.exit_journey(&mut store));
        assert_eq!(store.state(), CinematicState::Assembled);
        assert_eq!(store.ribbon_progress(), 0.4);
    }

    #[test]
    fn dolly_scales_distance_within_limits() {
        let (mut seq, mut store) = assembled(1.0);
        let home = seq.orbit().goal().radius;
        assert!(seq.on_dolly(-100.0, &store));
        assert!((seq.orbit().goal().radius - home * 0.8).abs() < 1e-3);
        for _ in 0..50 {
            seq.on_dolly(-200.0, &store);
        }
        assert_eq!(seq.orbit().goal().radius, 15.0);
        for _ in 0..50 {
            seq.on_dolly(500.0, &store);
        }
        assert_eq!(seq.orbit().goal().radius, 70.0);

        seq.start_journey(&mut store);
        assert!(!seq.on_dolly(-100.0, &store));
        assert_eq!(seq.orbit().goal().radius, 70.0);
    }

    #[test]
    fn exit_journey_from_flight() {
        let (mut seq, mut store) = assembled(1.0);
        seq.start_journey(&mut store);
        let f = run_until(&mut seq, &mut store, 1, CinematicState::Flight);
        for g in f + 1..f + 600 {
            seq.tick(at(g), Vec2::ZERO, &mut store);
        }
        let where_we_were = seq.pose().position;
        assert!(seq.exit_journey(&mut store));
        assert_eq!(store.state(), CinematicState::Assembled);
        assert_eq!(store.ribbon_progress(), 0.0);
        assert!(seq.orbit().enabled());
        assert_eq!(seq.time_in_state(), 0.0);

        // Eases home from the flight position instead of jumping.
        let frame = seq.tick(at(f + 600), Vec2::ZERO, &mut store);
        assert_eq!(frame.drive, Drive::Orbit);
        assert!(frame.pose.position.distance(where_we_were) < 1.0);
    }

    #[test]
    fn manual_input_is_ignored_while_autonomous() {
        let (mut seq, mut store) = assembled(1.0);
        seq.start_journey(&mut store);
        let goal = seq.orbit().goal();
        assert!(!seq.on_scroll(-500.0, &mut store));
        assert!(!seq.on_key(OrbitKey::Left, &store));
        assert!(!seq.on_key(OrbitKey::Up, &store));
        assert_eq!(store.morph_progress(), 1.0);
        assert_eq!(seq.orbit().goal(), goal);
    }

    #[test]
    fn scroll_drives_morph_and_state() {
        let (mut seq, mut store) = setup();
        seq.tick(0.0, Vec2::ZERO, &mut store);
        assert!(seq.on_scroll(300.0, &mut store));
        assert!((store.morph_progress() - 0.45).abs() < 1e-6);
        assert_eq!(store.state(), CinematicState::Scattered);
        seq.on_scroll(100.0, &mut store);
        assert_eq!(store.state(), CinematicState::Assembled);
        seq.on_scroll(-200.0, &mut store);
        assert_eq!(store.state(), CinematicState::Assembled);
        seq.on_scroll(-10_000.0, &mut store);
        assert_eq!(store.morph_progress(), 0.0);
        assert_eq!(store.state(), CinematicState::Scattered);
    }

    #[test]
    fn scroll_yields_to_a_tracked_hand() {
        let (mut seq, mut store) = setup();
        store.set_gesture_tracking(true);
        store.set_hand_detected(true);
        assert!(!seq.on_scroll(500.0, &mut store));
        assert_eq!(store.morph_progress(), 0.0);
    }

    #[test]
    fn arrow_keys_orbit_and_pan_within_limits() {
        let (mut seq, store) = setup();
        let az = seq.orbit().goal().azimuth;
        assert!(seq.on_key(OrbitKey::Right, &store));
        assert!((seq.orbit().goal().azimuth - (az + 0.05)).abs() < 1e-6);

        for _ in 0..100 {
            seq.on_key(OrbitKey::Up, &store);
        }
        assert_eq!(seq.orbit().target_goal().y, 10.0);
        for _ in 0..100 {
            seq.on_key(OrbitKey::Down, &store);
        }
        assert_eq!(seq.orbit().target_goal().y, -9.0);
    }

    #[test]
    fn assemble_runs_scripted_morph() {
        let (mut seq, mut store) = setup();
        seq.tick(0.0, Vec2::ZERO, &mut store);
        assert!(seq.assemble(&mut store));
        assert_eq!(store.state(), CinematicState::Morphing);
        assert!(!seq.on_scroll(-100.0, &mut store));

        for f in 1..=105 {
            seq.tick(at(f), Vec2::ZERO, &mut store);
        }
        assert!((store.morph_progress() - 0.5).abs() < 1e-3);
        let done = run_until(&mut seq, &mut store, 106, CinematicState::Assembled);
        assert_eq!(done, 210);
        assert_eq!(store.morph_progress(), 1.0);
        assert_eq!(store.shape(), Shape::Assembled);
        assert!(!seq.assemble(&mut store));
    }

    #[test]
    fn gesture_morph_crossing_assembles_and_scatters() {
        let (mut seq, mut store) = setup();
        store.set_gesture_tracking(true);
        store.set_hand_detected(true);
        store.set_morph_progress(0.6);
        store.set_shape(Shape::Assembled);
        seq.tick(0.0, Vec2::ZERO, &mut store);
        assert_eq!(store.state(), CinematicState::Assembled);

        store.set_morph_progress(0.4);
        store.set_shape(Shape::Scattered);
        seq.tick(at(1), Vec2::ZERO, &mut store);
        assert_eq!(store.state(), CinematicState::Scattered);
    }

    #[test]
    fn tracked_hand_steers_the_orbit() {
        let (mut seq, mut store) = setup();
        store.set_gesture_tracking(true);
        store.set_hand_detected(true);
        store.set_pointing_target(Some(PointingTarget { yaw: 0.25, pitch: -0.3 }));
        let frame = seq.tick(0.0, Vec2::ZERO, &mut store);
        assert_eq!(frame.drive, Drive::Orbit);
        let goal = seq.orbit().goal();
        assert!((goal.azimuth - 0.25 * PI).abs() < 1e-6);
        assert!((goal.polar - (FRAC_PI_2 - 0.3 * PI / 6.0)).abs() < 1e-6);
    }

    #[test]
    fn a_stall_cannot_skip_states() {
        let (mut seq, mut store) = assembled(1.0);
        seq.start_journey(&mut store);
        seq.tick(at(1), Vec2::ZERO, &mut store);
        seq.tick(600.0, Vec2::ZERO, &mut store);
        assert_eq!(store.state(), CinematicState::RibbonRise);
        assert!(store.ribbon_progress() < 0.1);
        // Time running backwards is harmless too.
        seq.tick(1.0, Vec2::ZERO, &mut store);
        assert_eq!(store.state(), CinematicState::RibbonRise);
    }

    #[test]
    fn reset_returns_to_scattered() {
        let (mut seq, mut store) = assembled(1.0);
        store.set_gesture_tracking(true);
        seq.start_journey(&mut store);
        run_until(&mut seq, &mut store, 1, CinematicState::Flight);
        seq.reset(&mut store);
        assert_eq!(store.state(), CinematicState::Scattered);
        assert_eq!(store.morph_progress(), 0.0);
        assert_eq!(store.ribbon_progress(), 0.0);
        assert!(seq.orbit().enabled());
    }

    // ── property tests ────────────────────────────────────────────────────

    #[derive(Clone, Debug)]
    enum Event {
        Wait(u32),
        Start,
        Exit,
        Assemble,
        Reset,
        Scroll(f32),
        Key(u8),
    }

    fn event() -> impl Strategy<Value = Event> {
        prop_oneof![
            4 => (1u32..2000).prop_map(Event::Wait),
            2 => Just(Event::Start),
            1 => Just(Event::Exit),
            1 => Just(Event::Assemble),
            1 => Just(Event::Reset),
            2 => (-800.0f32..800.0).prop_map(Event::Scroll),
            1 => (0u8..4).prop_map(Event::Key),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn every_journey_comes_home(events in prop::collection::vec(event(), 1..40)) {
            let (mut seq, mut store) = setup();
            let mut f = 0u32;
            seq.tick(at(f), Vec2::ZERO, &mut store);

            for e in events {
                match e {
                    Event::Wait(n) => for _ in 0..n {
                        f += 1;
                        let frame = seq.tick(at(f), Vec2::ZERO, &mut store);
                        prop_assert_eq!(frame.drive == Drive::Path, frame.u.is_some());
                        prop_assert!((0.0..=1.0).contains(&store.morph_progress()));
                        prop_assert!((0.0..=1.0).contains(&store.ribbon_progress()));
                    },
                    Event::Start => { seq.start_journey(&mut store); }
                    Event::Exit => { seq.exit_journey(&mut store); }
                    Event::Assemble => { seq.assemble(&mut store); }
                    Event::Reset => seq.reset(&mut store),
                    Event::Scroll(d) => { seq.on_scroll(d, &mut store); }
                    Event::Key(k) => {
                        let key = [OrbitKey::Left, OrbitKey::Right, OrbitKey::Up, OrbitKey::Down][k as usize];
                        seq.on_key(key, &store);
                    }
                }
            }

            // Longest journey: 4 + 1 + 1.5 + 90 + 12.5 s, plus a morph.
            for _ in 0..(115 * 60) {
                f += 1;
                seq.tick(at(f), Vec2::ZERO, &mut store);
            }
            prop_assert!(store.state().is_interactive());
            prop_assert_ne!(store.state(), CinematicState::Morphing);
            prop_assert!(seq.orbit().enabled());
        }
    }
}
