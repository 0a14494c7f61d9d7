//! Configuration
//!
//! Every tuning constant of the rig lives here with its default.  A config
//! file is TOML; every section and every field is optional, so an empty file
//! yields [`RigConfig::default`].
//!
//! ```toml
//! [gesture]
//! smoothing_gain = 0.1
//!
//! [sequence]
//! flight_duration = 60.0
//!
//! [orbit]
//! home_position = [0.0, 6.0, 40.0]
//! ```

use std::f32::consts::PI;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use hand_signal::GestureConfig;

use crate::error::{Result, RigError};

// ════════════════════════════════════════════════════════════════════════════
// RigConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Gesture pipeline thresholds and gains
    pub gesture:  GestureConfig,
    /// Cinematic sequence timing
    pub sequence: SequenceConfig,
    /// Flight path geometry
    pub path:     PathConfig,
    /// Orbit controller limits and home viewpoint
    pub orbit:    OrbitConfig,
    /// Scroll and keyboard mappings
    pub input:    InputConfig,
    /// Logging defaults
    pub logging:  LoggingConfig,
}

impl RigConfig {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RigError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: RigConfig = toml::from_str(&content).map_err(|source| RigError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the rig cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.gesture.validate()?;

        let s = &self.sequence;
        positive("sequence.ribbon_rate", s.ribbon_rate)?;
        non_negative("sequence.star_dwell", s.star_dwell)?;
        non_negative("sequence.prepare_duration", s.prepare_duration)?;
        positive("sequence.flight_duration", s.flight_duration)?;
        non_negative("sequence.finale_duration", s.finale_duration)?;
        positive("sequence.morph_duration", s.morph_duration)?;
        unit("sequence.journey_gate", s.journey_gate)?;
        unit("sequence.center_pull", s.center_pull)?;
        non_negative("sequence.look_yaw_limit", s.look_yaw_limit)?;
        non_negative("sequence.look_pitch_limit", s.look_pitch_limit)?;
        positive("sequence.max_frame_delta", s.max_frame_delta)?;

        let p = &self.path;
        positive("path.height", p.height)?;
        non_negative("path.radius", p.radius)?;
        non_negative("path.turns", p.turns)?;
        finite("path.y_offset", p.y_offset)?;

        let o = &self.orbit;
        positive("orbit.smooth_time", o.smooth_time)?;
        if !(o.min_polar > 0.0 && o.min_polar <= o.max_polar && o.max_polar < PI) {
            return Err(invalid("orbit.min_polar", o.min_polar, "need 0 < min_polar <= max_polar < pi"));
        }
        positive("orbit.min_distance", o.min_distance)?;
        if !(o.max_distance.is_finite() && o.max_distance >= o.min_distance) {
            return Err(invalid("orbit.max_distance", o.max_distance, "must be finite and >= min_distance"));
        }
        if !(o.home_position.is_finite() && o.home_target.is_finite()) {
            return Err(invalid("orbit.home_position", f32::NAN, "home viewpoint must be finite"));
        }
        if o.home_position.distance(o.home_target) < 1e-3 {
            return Err(invalid("orbit.home_position", 0.0, "must differ from home_target"));
        }

        let i = &self.input;
        finite("input.scroll_gain", i.scroll_gain)?;
        if !(0.0..=1.0).contains(&i.scatter_below)
            || !(0.0..=1.0).contains(&i.assemble_above)
            || i.scatter_below >= i.assemble_above
        {
            return Err(invalid("input.scatter_below", i.scatter_below, "need 0 <= scatter_below < assemble_above <= 1"));
        }
        finite("input.rotate_step", i.rotate_step)?;
        finite("input.pan_step", i.pan_step)?;
        non_negative("input.dolly_gain", i.dolly_gain)?;
        if !(i.pan_min_y.is_finite() && i.pan_max_y.is_finite() && i.pan_min_y < i.pan_max_y) {
            return Err(invalid("input.pan_min_y", i.pan_min_y, "must be below pan_max_y"));
        }

        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

/// Timing of the scripted sequence.  Durations are in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Ribbon progress gained per second during the rise
    pub ribbon_rate:      f32,
    /// Hold after the ribbon reaches the top
    pub star_dwell:       f32,
    pub prepare_duration: f32,
    pub flight_duration:  f32,
    pub finale_duration:  f32,
    /// Length of the scripted scattered → assembled morph
    pub morph_duration:   f32,
    /// Morph value from which a journey may start outside `Assembled`
    pub journey_gate:     f32,
    /// How far the flight look target is pulled toward the path axis
    pub center_pull:      f32,
    /// Pointer look-around limits during flight, radians
    pub look_yaw_limit:   f32,
    pub look_pitch_limit: f32,
    /// Largest frame delta the sequencer will accept
    pub max_frame_delta:  f32,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        SequenceConfig {
            ribbon_rate:      0.25,
            star_dwell:       1.0,
            prepare_duration: 1.5,
            flight_duration:  90.0,
            finale_duration:  12.5,
            morph_duration:   3.5,
            journey_gate:     0.8,
            center_pull:      0.3,
            look_yaw_limit:   PI / 3.0,
            look_pitch_limit: PI / 4.0,
            max_frame_delta:  0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub height:   f32,
    /// Radius at the bottom of the spiral
    pub radius:   f32,
    pub turns:    f32,
    /// Vertical shift applied before the arc-length pass
    pub y_offset: f32,
}

impl Default for PathConfig {
    fn default() -> Self {
        // Tree radius 6 plus 10 units of clearance.
        PathConfig { height: 18.0, radius: 16.0, turns: 5.5, y_offset: -2.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Approximate time for the damped camera to reach its goal
    pub smooth_time:   f32,
    pub min_polar:     f32,
    pub max_polar:     f32,
    pub min_distance:  f32,
    pub max_distance:  f32,
    pub home_position: Vec3,
    pub home_target:   Vec3,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        OrbitConfig {
            smooth_time:   1.0,
            min_polar:     1.4,
            max_polar:     1.85,
            min_distance:  15.0,
            max_distance:  70.0,
            home_position: Vec3::new(0.0, 6.0, 50.0),
            home_target:   Vec3::ZERO,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Morph change per pixel of wheel travel
    pub scroll_gain:    f32,
    /// Scrolling below this returns to `Scattered`
    pub scatter_below:  f32,
    /// Scrolling above this from `Scattered` assembles
    pub assemble_above: f32,
    /// Azimuth change per arrow-key press, radians
    pub rotate_step:    f32,
    /// Vertical pan per arrow-key press
    pub pan_step:       f32,
    pub pan_max_y:      f32,
    pub pan_min_y:      f32,
    /// Fractional distance change per pixel of Shift+wheel travel
    pub dolly_gain:     f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            scroll_gain:    0.0015,
            scatter_below:  0.1,
            assemble_above: 0.5,
            rotate_step:    0.05,
            pan_step:       0.5,
            pan_max_y:      10.0,
            pan_min_y:      -9.0,
            dolly_gain:     0.002,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when neither `RUST_LOG` nor `-v` is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { level: "info".to_string() }
    }
}

// ── validation helpers ───────────────────────────────────────────────────────

fn invalid(field: &'static str, value: f32, reason: &'static str) -> RigError {
    RigError::Config { field, value: f64::from(value), reason }
}

fn finite(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() { Ok(()) } else { Err(invalid(field, value, "must be finite")) }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 { Ok(()) } else { Err(invalid(field, value, "must be finite and positive")) }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 { Ok(()) } else { Err(invalid(field, value, "must be finite and >= 0")) }
}

fn unit(field: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) { Ok(()) } else { Err(invalid(field, value, "must be in [0, 1]")) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        RigConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_file_gives_defaults() {
        let file = write_config("");
        assert_eq!(RigConfig::load(file.path()).unwrap(), RigConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let file = write_config(
            "[sequence]\nflight_duration = 60.0\n\n\
             [orbit]\nhome_position = [0.0, 6.0, 40.0]\n\n\
             [gesture]\nsmoothing_gain = 0.1\n",
        );
        let cfg = RigConfig::load(file.path()).unwrap();
        assert_eq!(cfg.sequence.flight_duration, 60.0);
        assert_eq!(cfg.sequence.finale_duration, 12.5);
        assert_eq!(cfg.orbit.home_position, Vec3::new(0.0, 6.0, 40.0));
        assert_eq!(cfg.orbit.max_distance, 70.0);
        assert_eq!(cfg.gesture.smoothing_gain, 0.1);
        assert_eq!(cfg.gesture.open_run_threshold, 8);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RigConfig::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, RigError::ConfigRead { .. }));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let file = write_config("[sequence\nflight_duration = ");
        assert!(matches!(RigConfig::load(file.path()).unwrap_err(), RigError::ConfigParse { .. }));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let file = write_config("[sequence]\nflight_duration = 0.0\n");
        assert!(matches!(
            RigConfig::load(file.path()).unwrap_err(),
            RigError::Config { field: "sequence.flight_duration", .. }
        ));

        let mut cfg = RigConfig::default();
        cfg.orbit.min_polar = 2.0;
        assert!(cfg.validate().is_err());

        let mut cfg = RigConfig::default();
        cfg.input.scatter_below = 0.6;
        assert!(cfg.validate().is_err());

        let mut cfg = RigConfig::default();
        cfg.gesture.smoothing_gain = 0.0;
        assert!(matches!(cfg.validate().unwrap_err(), RigError::Signal(_)));
    }

    #[test]
    fn serialised_defaults_load_back() {
        let text = toml::to_string(&RigConfig::default()).unwrap();
        let file = write_config(&text);
        assert_eq!(RigConfig::load(file.path()).unwrap(), RigConfig::default());
    }
}
