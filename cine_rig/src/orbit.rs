//! Damped orbit controller and camera pose.
//!
//! The controller keeps a *current* and a *goal* view, each described as a
//! look-at target plus spherical offset (radius, polar angle from +Y,
//! azimuth around +Y with 0 on +Z).  Every [`OrbitController::update`] moves
//! each component toward its goal with a critically damped spring whose
//! settle time is `smooth_time`, so any goal change (key press, gesture,
//! scripted move) is eased rather than snapped.
//!
//! `enabled` gates *user* input only (`rotate`, `rotate_to`, `pan_vertical`).
//! Scripted moves (`set_look_at`, `jump_to`) always apply, and the polar and
//! distance limits only bound user input.

use std::f32::consts::{PI, TAU};

use glam::{Mat3, Quat, Vec3};

use crate::config::OrbitConfig;

// ════════════════════════════════════════════════════════════════════════════
// CameraPose
// ════════════════════════════════════════════════════════════════════════════

/// Camera position and orientation.  The camera looks down its local -Z
/// axis with +Y up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position:    Vec3,
    pub orientation: Quat,
}

impl CameraPose {
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        CameraPose { position, orientation: look_rotation(target - position) }
    }

    pub fn forward(&self) -> Vec3 { self.orientation * Vec3::NEG_Z }
    pub fn up(&self)      -> Vec3 { self.orientation * Vec3::Y }
}

/// Rotation that turns local -Z toward `direction`, keeping +Y up.
pub fn look_rotation(direction: Vec3) -> Quat {
    let f = direction.normalize_or_zero();
    if f == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let mut right = f.cross(Vec3::Y);
    if right.length_squared() < 1e-8 {
        // Looking straight up or down.
        right = Vec3::X;
    }
    let right = right.normalize();
    let up = right.cross(f);
    Quat::from_mat3(&Mat3::from_cols(right, up, -f))
}

// ════════════════════════════════════════════════════════════════════════════
// Spherical offsets
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spherical {
    pub radius:  f32,
    /// Angle from +Y, `[0, π]`
    pub polar:   f32,
    /// Angle around +Y, 0 on +Z
    pub azimuth: f32,
}

impl Spherical {
    pub fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius < f32::EPSILON {
            return Spherical { radius: 0.0, polar: PI / 2.0, azimuth: 0.0 };
        }
        Spherical {
            radius,
            polar:   (v.y / radius).clamp(-1.0, 1.0).acos(),
            azimuth: v.x.atan2(v.z),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let s = self.polar.sin();
        Vec3::new(
            self.radius * s * self.azimuth.sin(),
            self.radius * self.polar.cos(),
            self.radius * s * self.azimuth.cos(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Critically damped spring
// ════════════════════════════════════════════════════════════════════════════

/// Move `current` toward `goal`, updating `velocity`.  Never overshoots.
fn smooth_damp(current: f32, goal: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let omega = 2.0 / smooth_time.max(1e-4);
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - goal;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let out = goal + (change + temp) * decay;

    if (goal - current > 0.0) == (out > goal) {
        *velocity = 0.0;
        return goal;
    }
    out
}

fn smooth_damp_vec(current: Vec3, goal: Vec3, velocity: &mut Vec3, smooth_time: f32, dt: f32) -> Vec3 {
    Vec3::new(
        smooth_damp(current.x, goal.x, &mut velocity.x, smooth_time, dt),
        smooth_damp(current.y, goal.y, &mut velocity.y, smooth_time, dt),
        smooth_damp(current.z, goal.z, &mut velocity.z, smooth_time, dt),
    )
}

// ════════════════════════════════════════════════════════════════════════════
// OrbitController
// ════════════════════════════════════════════════════════════════════════════

pub struct OrbitController {
    cfg:         OrbitConfig,
    enabled:     bool,

    target:      Vec3,
    target_goal: Vec3,
    target_vel:  Vec3,

    sph:         Spherical,
    sph_goal:    Spherical,
    sph_vel:     Spherical,
}

impl OrbitController {
    /// Start at the configured home viewpoint, at rest.
    pub fn new(cfg: OrbitConfig) -> Self {
        let mut orbit = OrbitController {
            enabled:     true,
            target:      Vec3::ZERO,
            target_goal: Vec3::ZERO,
            target_vel:  Vec3::ZERO,
            sph:         Spherical::default(),
            sph_goal:    Spherical::default(),
            sph_vel:     Spherical::default(),
            cfg,
        };
        orbit.jump_to(orbit.cfg.home_position, orbit.cfg.home_target);
        orbit
    }

    pub fn enabled(&self) -> bool { self.enabled }
    pub fn set_enabled(&mut self, enabled: bool) { self.enabled = enabled; }

    pub fn target(&self)      -> Vec3      { self.target }
    pub fn target_goal(&self) -> Vec3      { self.target_goal }
    pub fn spherical(&self)   -> Spherical { self.sph }
    pub fn goal(&self)        -> Spherical { self.sph_goal }

    pub fn position(&self)      -> Vec3 { self.target + self.sph.to_offset() }
    pub fn goal_position(&self) -> Vec3 { self.target_goal + self.sph_goal.to_offset() }

    pub fn pose(&self) -> CameraPose {
        CameraPose::looking_at(self.position(), self.target)
    }

    // ── user input ────────────────────────────────────────────────────────

    /// Add to the goal azimuth and polar angles.
    pub fn rotate(&mut self, d_azimuth: f32, d_polar: f32) -> bool {
        if !self.enabled {
            return false;
        }
        self.sph_goal.azimuth += d_azimuth;
        self.sph_goal.polar = self.clamp_polar(self.sph_goal.polar + d_polar);
        true
    }

    /// Set the goal azimuth and polar angles.
    pub fn rotate_to(&mut self, azimuth: f32, polar: f32) -> bool {
        if !self.enabled || !(azimuth.is_finite() && polar.is_finite()) {
            return false;
        }
        self.sph_goal.azimuth = azimuth;
        self.sph_goal.polar = self.clamp_polar(polar);
        true
    }

    /// Move target and camera up or down together.
    pub fn pan_vertical(&mut self, dy: f32) -> bool {
        if !self.enabled {
            return false;
        }
        self.target_goal.y += dy;
        true
    }

    /// Change the goal distance.
    pub fn dolly_to(&mut self, distance: f32) -> bool {
        if !self.enabled || !distance.is_finite() {
            return false;
        }
        self.sph_goal.radius = distance.clamp(self.cfg.min_distance, self.cfg.max_distance);
        true
    }

    // ── scripted moves ────────────────────────────────────────────────────

    /// Ease toward a camera at `position` looking at `target`.
    pub fn set_look_at(&mut self, position: Vec3, target: Vec3) {
        let mut goal = Spherical::from_offset(position - target);
        // Take the short way round.
        goal.azimuth += TAU * ((self.sph.azimuth - goal.azimuth) / TAU).round();
        self.target_goal = target;
        self.sph_goal = goal;
    }

    /// Place the camera immediately, at rest.
    pub fn jump_to(&mut self, position: Vec3, target: Vec3) {
        let sph = Spherical::from_offset(position - target);
        self.target = target;
        self.target_goal = target;
        self.target_vel = Vec3::ZERO;
        self.sph = sph;
        self.sph_goal = sph;
        self.sph_vel = Spherical::default();
    }

    /// Send the camera back to the configured home viewpoint.
    pub fn go_home(&mut self) {
        self.set_look_at(self.cfg.home_position, self.cfg.home_target);
    }

    /// Advance the springs by `dt` seconds and return the new pose.
    pub fn update(&mut self, dt: f32) -> CameraPose {
        let st = self.cfg.smooth_time;
        self.target = smooth_damp_vec(self.target, self.target_goal, &mut self.target_vel, st, dt);
        self.sph.radius  = smooth_damp(self.sph.radius,  self.sph_goal.radius,  &mut self.sph_vel.radius,  st, dt);
        self.sph.polar   = smooth_damp(self.sph.polar,   self.sph_goal.polar,   &mut self.sph_vel.polar,   st, dt);
        self.sph.azimuth = smooth_damp(self.sph.azimuth, self.sph_goal.azimuth, &mut self.sph_vel.azimuth, st, dt);
        self.pose()
    }

    fn clamp_polar(&self, polar: f32) -> f32 {
        polar.clamp(self.cfg.min_polar, self.cfg.max_polar)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn orbit() -> OrbitController {
        OrbitController::new(OrbitConfig::default())
    }

    fn settle(o: &mut OrbitController) {
        for _ in 0..1200 {
            o.update(1.0 / 60.0);
        }
    }

    #[test]
    fn starts_at_home() {
        let o = orbit();
        assert!(o.position().distance(Vec3::new(0.0, 6.0, 50.0)) < 1e-4);
        assert!(o.pose().forward().dot((Vec3::ZERO - o.position()).normalize()) > 0.9999);
    }

    #[test]
    fn spherical_round_trip() {
        let v = Vec3::new(3.0, -2.0, 7.0);
        assert!(Spherical::from_offset(v).to_offset().distance(v) < 1e-4);
    }

    #[test]
    fn look_rotation_keeps_up_vector() {
        let pose = CameraPose::looking_at(Vec3::new(5.0, 1.0, 5.0), Vec3::new(0.0, 1.0, 0.0));
        assert!(pose.forward().distance(Vec3::new(-1.0, 0.0, -1.0).normalize()) < 1e-5);
        assert!(pose.up().y > 0.999);
        // Degenerate directions do not produce NaN.
        assert!(look_rotation(Vec3::Y).is_finite());
        assert!(look_rotation(Vec3::ZERO).is_finite());
    }

    #[test]
    fn damping_eases_without_overshoot() {
        let mut o = orbit();
        o.rotate_to(1.0, 1.6);
        let mut last = o.spherical().azimuth;
        for _ in 0..600 {
            o.update(1.0 / 60.0);
            let now = o.spherical().azimuth;
            assert!(now >= last - 1e-6 && now <= 1.0 + 1e-6);
            last = now;
        }
        assert!((o.spherical().azimuth - 1.0).abs() < 1e-3);
    }

    #[test]
    fn one_smooth_time_covers_most_of_the_way() {
        let mut o = orbit();
        o.rotate_to(1.0, o.goal().polar);
        for _ in 0..60 {
            o.update(1.0 / 60.0);
        }
        let az = o.spherical().azimuth;
        assert!(az > 0.5 && az < 1.0, "azimuth after 1 s: {}", az);
    }

    #[test]
    fn user_input_respects_limits_and_enabled() {
        let mut o = orbit();
        o.rotate_to(0.0, 0.1);
        assert_eq!(o.goal().polar, 1.4);
        o.rotate(0.0, 5.0);
        assert_eq!(o.goal().polar, 1.85);
        o.dolly_to(500.0);
        assert_eq!(o.goal().radius, 70.0);

        o.set_enabled(false);
        let before = o.goal();
        assert!(!o.rotate(0.3, 0.0));
        assert!(!o.rotate_to(2.0, 1.5));
        assert!(!o.pan_vertical(1.0));
        assert_eq!(o.goal(), before);
    }

    #[test]
    fn scripted_moves_ignore_enabled_and_limits() {
        let mut o = orbit();
        o.set_enabled(false);
        let pos = Vec3::new(16.0, -11.0, 0.0);
        let target = Vec3::new(15.0, -11.0, 1.0);
        o.set_look_at(pos, target);
        settle(&mut o);
        assert!(o.position().distance(pos) < 1e-2);
        assert!(o.target().distance(target) < 1e-2);
    }

    #[test]
    fn set_look_at_takes_short_way_round() {
        let mut o = orbit();
        o.jump_to(Vec3::new(-1.0, 0.0, -50.0), Vec3::ZERO);
        let start = o.spherical().azimuth;
        o.set_look_at(Vec3::new(1.0, 0.0, -50.0), Vec3::ZERO);
        assert!((o.goal().azimuth - start).abs() < 0.1);
    }

    #[test]
    fn zero_dt_does_not_move() {
        let mut o = orbit();
        o.rotate_to(1.0, 1.6);
        let before = o.pose();
        assert_eq!(o.update(0.0), before);
    }
}
