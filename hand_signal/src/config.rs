//! Tuning constants for the gesture pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SignalError};

/// Gesture thresholds and gains.  All distances are in the detector's
/// normalised landmark units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Minimum wrist → index-MCP distance for a hand to count as present.
    /// Smaller palms are too far from the camera to classify reliably.
    pub proximity_gate: f32,
    /// Openness ratio above which a single sample reads as "open".
    pub openness_ratio: f32,
    /// Wrist travel per sample above which the sample does not vote.
    pub motion_gate: f32,
    /// Consecutive open votes needed to flip to open.
    pub open_run_threshold: u32,
    /// Consecutive closed votes needed to flip to closed.
    pub closed_run_threshold: u32,
    /// One-pole filter gain applied to the morph value per sample.
    pub smoothing_gain: f32,
    /// Yaw change per unit of horizontal wrist travel.
    pub yaw_sensitivity: f32,
    /// Pitch change per unit of vertical wrist travel.
    pub pitch_sensitivity: f32,
    /// Run length written into the winning counter on re-entry.
    pub reentry_seed_run: u32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            proximity_gate:       0.15,
            openness_ratio:       1.6,
            motion_gate:          0.08,
            open_run_threshold:   8,
            closed_run_threshold: 6,
            smoothing_gain:       0.08,
            yaw_sensitivity:      2.5,
            pitch_sensitivity:    2.5,
            reentry_seed_run:     10,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> Result<()> {
        positive("proximity_gate", self.proximity_gate)?;
        positive("openness_ratio", self.openness_ratio)?;
        positive("motion_gate", self.motion_gate)?;
        if self.open_run_threshold == 0 {
            return Err(invalid("open_run_threshold", 0.0, "must be at least 1"));
        }
        if self.closed_run_threshold == 0 {
            return Err(invalid("closed_run_threshold", 0.0, "must be at least 1"));
        }
        if !(self.smoothing_gain > 0.0 && self.smoothing_gain <= 1.0) {
            return Err(invalid("smoothing_gain", self.smoothing_gain, "must be in (0, 1]"));
        }
        finite("yaw_sensitivity", self.yaw_sensitivity)?;
        finite("pitch_sensitivity", self.pitch_sensitivity)?;
        Ok(())
    }
}

fn invalid(field: &'static str, value: f32, reason: &'static str) -> SignalError {
    SignalError::InvalidConfig { field, value, reason }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite and positive"))
    }
}

fn finite(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GestureConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_gain_above_one() {
        let cfg = GestureConfig { smoothing_gain: 1.5, ..Default::default() };
        assert!(matches!(
            cfg.validate(),
            Err(SignalError::InvalidConfig { field: "smoothing_gain", .. })
        ));
    }

    #[test]
    fn rejects_zero_thresholds() {
        let cfg = GestureConfig { closed_run_threshold: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
        let cfg = GestureConfig { proximity_gate: 0.0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }
}
